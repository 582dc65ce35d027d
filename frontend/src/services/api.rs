use gloo::net::http::Request;
use shared::{AvailabilitySnapshot, CreateAppointmentRequest, CreateAppointmentResponse};

/// API client for communicating with the backend server
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// Create a new API client with the default base URL
    pub fn new() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }

    /// Re-query the dates that already hold a scheduled appointment
    pub async fn get_booked_dates(&self) -> Result<AvailabilitySnapshot, String> {
        let url = format!("{}/api/appointments/booked-dates", self.base_url);

        match Request::get(&url).send().await {
            Ok(response) => {
                if response.ok() {
                    match response.json::<AvailabilitySnapshot>().await {
                        Ok(data) => Ok(data),
                        Err(e) => Err(format!("Failed to parse booked dates: {}", e)),
                    }
                } else {
                    let error_text = response.text().await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    Err(error_text)
                }
            }
            Err(e) => Err(format!("Failed to fetch booked dates: {}", e)),
        }
    }

    /// Book an appointment.
    ///
    /// Rejections (date taken, invalid input) come back as `Ok` with
    /// `success == false`; `Err` is reserved for transport and parse failures.
    pub async fn create_appointment(&self, request: &CreateAppointmentRequest) -> Result<CreateAppointmentResponse, String> {
        let url = format!("{}/api/appointments", self.base_url);

        match Request::post(&url)
            .json(request)
            .map_err(|e| format!("Failed to serialize request: {}", e))?
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                match response.json::<CreateAppointmentResponse>().await {
                    Ok(data) => Ok(data),
                    Err(e) => Err(format!("Server error {}: {}", status, e)),
                }
            }
            Err(e) => Err(format!("Network error: {}", e)),
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
