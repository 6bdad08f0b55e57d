use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use classaccess_core::AppError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

fn format_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| format!("{}: {}", field, msg))
                    .unwrap_or_else(|| format!("{} no es válido", field))
            })
        })
        .collect();
    messages.sort();
    messages
}

/// JSON body extractor that runs `validator` rules before the handler sees
/// the value. Every failure is a 400 with the broken rules listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("desconocido");
                    return AppError::validation(vec![format!("{} es obligatorio", field)]);
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::bad_request(
                        "Falta el encabezado 'Content-Type: application/json'",
                    );
                }

                AppError::validation(vec!["Cuerpo de la solicitud inválido".to_string()])
            })?;

        value
            .validate()
            .map_err(|errors| AppError::validation(format_errors(&errors)))?;

        Ok(ValidatedJson(value))
    }
}
