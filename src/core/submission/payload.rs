//! The JSON document posted to the work order endpoint.

use crate::core::form::WorkOrderForm;
use crate::core::location::Coordinate;
use crate::error::SubmitError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Work order as sent over the wire.
///
/// Field names are fixed by the receiving endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(rename = "ordenTrabajo")]
    pub order_number: String,
    #[serde(rename = "tecnico")]
    pub technician: String,
    /// Stamped photos as `data:image/jpeg;base64,...` URLs, in form order
    #[serde(rename = "fotos")]
    pub photos: Vec<String>,
    #[serde(rename = "ubicacion")]
    pub location: Option<Coordinate>,
    #[serde(rename = "direccion")]
    pub address: String,
    /// ISO-8601 UTC timestamp taken at submit time
    #[serde(rename = "fecha")]
    pub submitted_at: String,
}

impl SubmissionPayload {
    pub fn from_form(form: &WorkOrderForm, now: DateTime<Utc>) -> Self {
        Self {
            order_number: form.order_number.trim().to_string(),
            technician: form.technician.clone(),
            photos: form.photos.iter().map(|photo| photo.data_url()).collect(),
            location: form.location.coordinate,
            address: form.location.address.clone(),
            submitted_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, SubmitError> {
        serde_json::to_vec(self).map_err(|e| SubmitError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::{LocationContext, LocationStatus};
    use crate::core::photos::CapturedPhoto;
    use crate::core::watermark::EncodedImage;
    use chrono::TimeZone;
    use serde_json::Value;

    fn form() -> WorkOrderForm {
        let mut form = WorkOrderForm {
            order_number: " 12345 ".to_string(),
            technician: "Johan Hurtado".to_string(),
            location: LocationContext {
                coordinate: Some(Coordinate::new(-33.45, -70.66)),
                address: "Santiago, Chile".to_string(),
                status: LocationStatus::Resolved,
            },
            ..Default::default()
        };
        for name in ["a.jpg", "b.jpg"] {
            form.photos.add(CapturedPhoto::new(
                name,
                EncodedImage {
                    bytes: name.as_bytes().to_vec(),
                    width: 1,
                    height: 1,
                },
            ));
        }
        form
    }

    #[test]
    fn wire_keys_match_endpoint() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let payload = SubmissionPayload::from_form(&form(), now);
        let json: Value = serde_json::from_slice(&payload.to_json().unwrap()).unwrap();

        assert_eq!(json["ordenTrabajo"], "12345");
        assert_eq!(json["tecnico"], "Johan Hurtado");
        assert_eq!(json["ubicacion"]["lat"], -33.45);
        assert_eq!(json["ubicacion"]["lng"], -70.66);
        assert_eq!(json["direccion"], "Santiago, Chile");
        assert_eq!(json["fecha"], "2024-03-05T14:07:09.000Z");
        assert_eq!(json.as_object().unwrap().len(), 6);
    }

    #[test]
    fn photos_keep_form_order() {
        let payload = SubmissionPayload::from_form(&form(), Utc::now());

        assert_eq!(payload.photos.len(), 2);
        assert!(payload.photos.iter().all(|p| p.starts_with("data:image/jpeg;base64,")));
        // base64 of "a.jpg" / "b.jpg"
        assert!(payload.photos[0].ends_with("YS5qcGc="));
        assert!(payload.photos[1].ends_with("Yi5qcGc="));
    }

    #[test]
    fn missing_location_serializes_as_null() {
        let mut form = form();
        form.location = LocationContext::default();

        let payload = SubmissionPayload::from_form(&form, Utc::now());
        let json: Value = serde_json::from_slice(&payload.to_json().unwrap()).unwrap();

        assert!(json["ubicacion"].is_null());
        assert_eq!(json["direccion"], "");
    }
}
