//! Deserializing into a success or a failure shape

use std::any::type_name;

use serde::{
    de::{DeserializeOwned, Error as _},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::defaults::CodingError;
use crate::env;

/// A `Result` that deserializes from whichever of its two shapes matches.
///
/// The input is tried as `T` first, then as `E`. When neither fits, the
/// error from the `T` attempt is reported to the installed diagnostics sink
/// and deserialization fails with the error from the `E` attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResult<T, E>(pub Result<T, E>);

impl<T, E> DecodedResult<T, E> {
    /// Unwrap into a plain `Result`
    pub fn into_result(self) -> Result<T, E> {
        self.0
    }
}

impl<T, E> From<DecodedResult<T, E>> for Result<T, E> {
    fn from(decoded: DecodedResult<T, E>) -> Self {
        decoded.0
    }
}

impl<'de, T, E> Deserialize<'de> for DecodedResult<T, E>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let success_error = match T::deserialize(&value) {
            Ok(success) => return Ok(Self(Ok(success))),
            Err(err) => err,
        };

        match E::deserialize(&value) {
            Ok(failure) => Ok(Self(Err(failure))),
            Err(failure_error) => {
                env::diagnostics()
                    .log_coding_error(type_name::<Self>(), &CodingError::Json(success_error));
                Err(D::Error::custom(failure_error))
            }
        }
    }
}

impl<T: Serialize, E: Serialize> Serialize for DecodedResult<T, E> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Ok(success) => success.serialize(serializer),
            Err(failure) => failure.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct ApiError {
        code: u16,
        message: String,
    }

    type Response = DecodedResult<User, ApiError>;

    #[test]
    fn test_decodes_success() {
        let decoded: Response = serde_json::from_str(r#"{"id":1,"name":"Ada"}"#).unwrap();

        assert_eq!(
            decoded.into_result(),
            Ok(User {
                id: 1,
                name: "Ada".to_string()
            })
        );
    }

    #[test]
    fn test_decodes_failure() {
        let decoded: Response =
            serde_json::from_str(r#"{"code":404,"message":"no such user"}"#).unwrap();

        let result: Result<User, ApiError> = decoded.into();
        assert_eq!(
            result,
            Err(ApiError {
                code: 404,
                message: "no such user".to_string()
            })
        );
    }

    #[test]
    fn test_neither_shape_fails() {
        let decoded: Result<Response, _> = serde_json::from_str(r#"{"unexpected":true}"#);
        assert!(decoded.is_err());
    }

    #[test]
    fn test_serializes_inner_shape() {
        let ok: Response = DecodedResult(Ok(User {
            id: 2,
            name: "Alan".to_string(),
        }));
        assert_eq!(
            serde_json::to_string(&ok).unwrap(),
            r#"{"id":2,"name":"Alan"}"#
        );

        let err: Response = DecodedResult(Err(ApiError {
            code: 500,
            message: "boom".to_string(),
        }));
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"code":500,"message":"boom"}"#
        );
    }
}
