//! Declarative port errors.
//!
//! `define_port_error!` expands to a `thiserror` enum in which every variant
//! names the domain [`ErrorCode`](crate::domain::ErrorCode) it surfaces as.
//! The expansion also provides:
//! - one snake-case constructor per variant taking `impl Into<T>` fields,
//! - `code()` returning the declared category,
//! - `From<Enum> for domain::Error`, carrying the display text as message.
//!
//! Services match the variants that need structured details and convert the
//! rest with `?` or `.into()`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )?
                    => $code:ident : $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Domain category this failure surfaces as.
            pub fn code(&self) -> $crate::domain::ErrorCode {
                match self {
                    $( Self::$variant { .. } => $crate::domain::ErrorCode::$code, )*
                }
            }
        }

        impl From<$name> for $crate::domain::Error {
            fn from(error: $name) -> Self {
                Self::new(error.code(), error.to_string())
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Expansion coverage.
    use rstest::rstest;

    use crate::domain::{ClubId, Error, ErrorCode};

    define_port_error! {
        pub enum SampleStoreError {
            Offline => InternalError: "store offline",
            Missing { club_id: ClubId } => NotFound: "club {club_id} missing",
            Rejected { reason: String, attempts: u32 } =>
                Conflict: "rejected after {attempts}: {reason}",
        }
    }

    #[rstest]
    fn unit_variants_get_zero_argument_constructors() {
        assert_eq!(SampleStoreError::offline().to_string(), "store offline");
    }

    #[rstest]
    fn field_constructors_accept_conversions() {
        let err = SampleStoreError::rejected("locked", 2_u32);
        assert_eq!(err.to_string(), "rejected after 2: locked");
    }

    #[rstest]
    #[case(SampleStoreError::offline(), ErrorCode::InternalError)]
    #[case(
        SampleStoreError::missing(ClubId::new("club-3").expect("valid id")),
        ErrorCode::NotFound
    )]
    #[case(SampleStoreError::rejected("locked", 1_u32), ErrorCode::Conflict)]
    fn variants_report_declared_codes(#[case] err: SampleStoreError, #[case] code: ErrorCode) {
        assert_eq!(err.code(), code);
    }

    #[rstest]
    fn converts_into_domain_error_with_display_message() {
        let club_id = ClubId::new("club-3").expect("valid id");
        let error = Error::from(SampleStoreError::missing(club_id));
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "club club-3 missing");
    }
}
