pub mod category;
pub mod comment;
pub mod compilation;
pub mod event;
pub mod request;
pub mod stats;
pub mod user;

use serde::Deserialize;
use thiserror::Error;

use crate::error::{AppError, Result};

#[derive(Debug, Error)]
#[error("unknown value: {0}")]
pub struct EnumParseError(pub String);

/// Implements the string representation and sqlx text codec for a
/// workflow-state enum stored in a VARCHAR column.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::EnumParseError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::models::EnumParseError(other.to_string())),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<$name>()?)
            }
        }
    };
}

pub(crate) use text_enum;

/// `from`/`size` paging parameters shared by every list endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub from: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

fn default_page_size() -> i64 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self { from: 0, size: default_page_size() }
    }
}

impl Pagination {
    /// Builds paging from optional query values, filling in the defaults.
    pub fn new(from: Option<i64>, size: Option<i64>) -> Self {
        Self { from: from.unwrap_or(0), size: size.unwrap_or_else(default_page_size) }
    }

    /// Returns `(limit, offset)`, rejecting negative offsets and
    /// non-positive page sizes.
    pub fn limit_offset(&self) -> Result<(i64, i64)> {
        if self.from < 0 {
            return Err(AppError::validation("Parameter 'from' must not be negative"));
        }
        if self.size <= 0 {
            return Err(AppError::validation("Parameter 'size' must be positive"));
        }
        Ok((self.size, self.from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_to_first_ten() {
        let page = Pagination::default();
        assert_eq!(page.limit_offset().unwrap(), (10, 0));
    }

    #[test]
    fn pagination_rejects_zero_size() {
        let page = Pagination { from: 0, size: 0 };
        assert!(page.limit_offset().is_err());
    }

    #[test]
    fn pagination_rejects_negative_from() {
        let page = Pagination { from: -1, size: 10 };
        assert!(page.limit_offset().is_err());
    }
}
