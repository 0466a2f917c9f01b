pub mod auth;
pub mod budget;
pub mod financial_goal;
pub mod transaction;

pub mod error {
    use actix_web::http::StatusCode;
    use actix_web::web::{JsonConfig, PathConfig, QueryConfig};
    use actix_web::{HttpResponse, HttpResponseBuilder};
    use ledger_common::accounting::{AccountingError, RecordKind, ValidationFailure};
    use ledger_common::request_io::outputs::{ErrorType, ServerErrorResponse};
    use ledger_common::token::TokenError;
    use std::fmt;
    use tokio::sync::oneshot;

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(String),
        InvalidInput(ValidationFailure),
        ConflictWithExisting(String),
        OutOfRange(String),

        // 401
        IncorrectCredential(String),
        BadToken(String),
        TokenExpired(String),
        TokenMissing(String),

        // 404
        DoesNotExist(String, RecordKind),

        // 500
        InternalError(String),
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let server_error: ServerErrorResponse = self.into();
            write!(f, "{:?}", server_error)
        }
    }

    impl From<HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: HttpErrorResponse) -> Self {
            (&resp).into()
        }
    }

    impl From<&HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: &HttpErrorResponse) -> Self {
            match resp {
                // 400
                HttpErrorResponse::IncorrectlyFormed(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectlyFormed,
                    err_message: format!("Incorrectly formed request: {msg}"),
                    field_errors: None,
                },
                HttpErrorResponse::InvalidInput(failure) => ServerErrorResponse {
                    err_type: ErrorType::InvalidInput,
                    err_message: String::from("Invalid input: One or more fields are invalid"),
                    field_errors: serde_json::to_value(failure).ok(),
                },
                HttpErrorResponse::ConflictWithExisting(msg) => ServerErrorResponse {
                    err_type: ErrorType::ConflictWithExisting,
                    err_message: format!("Conflict with existing data: {msg}"),
                    field_errors: None,
                },
                HttpErrorResponse::OutOfRange(msg) => ServerErrorResponse {
                    err_type: ErrorType::OutOfRange,
                    err_message: format!("Out of range: {msg}"),
                    field_errors: None,
                },

                // 401
                HttpErrorResponse::IncorrectCredential(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectCredential,
                    err_message: format!("Incorrect credential: {msg}"),
                    field_errors: None,
                },
                HttpErrorResponse::BadToken(msg) => ServerErrorResponse {
                    err_type: ErrorType::BadToken,
                    err_message: format!("Bad token: {msg}"),
                    field_errors: None,
                },
                HttpErrorResponse::TokenExpired(msg) => ServerErrorResponse {
                    err_type: ErrorType::TokenExpired,
                    err_message: format!("Token expired: {msg}"),
                    field_errors: None,
                },
                HttpErrorResponse::TokenMissing(msg) => ServerErrorResponse {
                    err_type: ErrorType::TokenMissing,
                    err_message: format!("Token missing: {msg}"),
                    field_errors: None,
                },

                // 404
                HttpErrorResponse::DoesNotExist(msg, kind) => ServerErrorResponse {
                    err_type: match kind {
                        RecordKind::User => ErrorType::UserDoesNotExist,
                        RecordKind::Income => ErrorType::IncomeDoesNotExist,
                        RecordKind::Expense => ErrorType::ExpenseDoesNotExist,
                        RecordKind::Budget => ErrorType::BudgetDoesNotExist,
                        RecordKind::FinancialGoal => ErrorType::FinancialGoalDoesNotExist,
                    },
                    err_message: format!("Does not exist: {msg}"),
                    field_errors: None,
                },

                // 500
                HttpErrorResponse::InternalError(msg) => ServerErrorResponse {
                    err_type: ErrorType::InternalError,
                    err_message: format!("Internal error: {msg}"),
                    field_errors: None,
                },
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code()).json(ServerErrorResponse::from(self))
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_)
                | HttpErrorResponse::InvalidInput(_)
                | HttpErrorResponse::ConflictWithExisting(_)
                | HttpErrorResponse::OutOfRange(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::IncorrectCredential(_)
                | HttpErrorResponse::BadToken(_)
                | HttpErrorResponse::TokenExpired(_)
                | HttpErrorResponse::TokenMissing(_) => StatusCode::UNAUTHORIZED,
                HttpErrorResponse::DoesNotExist(_, _) => StatusCode::NOT_FOUND,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl From<actix_web::error::BlockingError> for HttpErrorResponse {
        fn from(_err: actix_web::error::BlockingError) -> Self {
            HttpErrorResponse::InternalError(String::from("Actix thread pool failure"))
        }
    }

    impl From<oneshot::error::RecvError> for HttpErrorResponse {
        fn from(_err: oneshot::error::RecvError) -> Self {
            HttpErrorResponse::InternalError(String::from("Rayon thread pool failure"))
        }
    }

    impl From<TokenError> for HttpErrorResponse {
        fn from(err: TokenError) -> Self {
            match err {
                TokenError::TokenInvalid => {
                    HttpErrorResponse::BadToken(String::from("Invalid token"))
                }
                TokenError::TokenExpired => {
                    HttpErrorResponse::TokenExpired(String::from("Token expired"))
                }
                TokenError::TokenMissing => {
                    HttpErrorResponse::TokenMissing(String::from("Missing token"))
                }
            }
        }
    }

    impl From<AccountingError> for HttpErrorResponse {
        fn from(err: AccountingError) -> Self {
            match err {
                AccountingError::Validation(failure) => HttpErrorResponse::InvalidInput(failure),
                AccountingError::Duplicate(msg) => HttpErrorResponse::ConflictWithExisting(msg),
                AccountingError::NotFound(kind) => {
                    HttpErrorResponse::DoesNotExist(format!("{kind} not found"), kind)
                }
                AccountingError::Format(msg) => HttpErrorResponse::IncorrectlyFormed(msg),
                AccountingError::Range(msg) => HttpErrorResponse::OutOfRange(msg),
                AccountingError::Internal(msg) => {
                    log::error!("{msg}");
                    HttpErrorResponse::InternalError(msg)
                }
                AccountingError::Storage(e) => {
                    log::error!("{e}");
                    HttpErrorResponse::InternalError(String::from("Failed to access the ledger"))
                }
            }
        }
    }

    // Extractor failures (malformed JSON bodies, query strings, or path segments) get the same
    // JSON error body as handler failures
    pub fn json_config() -> JsonConfig {
        JsonConfig::default().error_handler(|err, _req| {
            HttpErrorResponse::IncorrectlyFormed(err.to_string()).into()
        })
    }

    pub fn query_config() -> QueryConfig {
        QueryConfig::default().error_handler(|err, _req| {
            HttpErrorResponse::IncorrectlyFormed(err.to_string()).into()
        })
    }

    pub fn path_config() -> PathConfig {
        PathConfig::default().error_handler(|err, _req| {
            HttpErrorResponse::IncorrectlyFormed(err.to_string()).into()
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use actix_web::body::to_bytes;
        use actix_web::ResponseError;
        use std::collections::BTreeMap;

        #[actix_web::test]
        async fn test_validation_failure_body() {
            let mut errors = BTreeMap::new();
            errors.insert(
                String::from("amount"),
                vec![String::from("Amount must be a number")],
            );

            let resp = HttpErrorResponse::from(AccountingError::Validation(
                ValidationFailure::Record(errors),
            ));
            assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

            let body = to_bytes(resp.error_response().into_body()).await.unwrap();
            let body: ServerErrorResponse = serde_json::from_slice(&body).unwrap();

            assert_eq!(body.err_type, ErrorType::InvalidInput);
            assert_eq!(
                body.field_errors,
                Some(serde_json::json!({ "amount": ["Amount must be a number"] }))
            );
        }

        #[actix_web::test]
        async fn test_accounting_error_statuses() {
            let resp = HttpErrorResponse::from(AccountingError::NotFound(RecordKind::Budget));
            assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
            let body = ServerErrorResponse::from(&resp);
            assert_eq!(body.err_type, ErrorType::BudgetDoesNotExist);
            assert!(body.field_errors.is_none());

            let resp = HttpErrorResponse::from(AccountingError::Duplicate(String::from("taken")));
            assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

            let resp = HttpErrorResponse::from(AccountingError::Range(String::from("month")));
            assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

            let resp = HttpErrorResponse::from(TokenError::TokenExpired);
            assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);

            let resp = HttpErrorResponse::from(AccountingError::Internal(String::from("boom")));
            assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
