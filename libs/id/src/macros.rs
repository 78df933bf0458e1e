//! Declarative macros used by generated code and by applications.

/// Registers converters for every ID type declared in the calling crate.
///
/// Shorthand for [`configure`](crate::registry::configure) with a
/// [`ModuleSet`](crate::registry::ModuleSet) scoped to the crate that invokes
/// the macro.
///
/// # Example
///
/// ```ignore
/// let mut converters = prefixid::ConverterSet::new();
/// prefixid::configure!(&mut converters);
/// ```
#[macro_export]
macro_rules! configure {
    ($target:expr) => {
        $crate::registry::configure(
            $target,
            &$crate::registry::ModuleSet::crate_of(::core::module_path!()),
        )
    };
}

/// Implements sqlx's `Type`, `Encode`, and `Decode` for an ID type.
///
/// Generated types always invoke this macro; it expands to nothing unless
/// the `sqlx` feature of this crate is enabled.
#[cfg(feature = "sqlx")]
#[doc(hidden)]
#[macro_export]
macro_rules! __impl_sqlx {
    ($name:ty) => {
        impl<DB> $crate::__private::sqlx::Type<DB> for $name
        where
            DB: $crate::__private::sqlx::Database,
            ::std::string::String: $crate::__private::sqlx::Type<DB>,
        {
            fn type_info() -> <DB as $crate::__private::sqlx::Database>::TypeInfo {
                <::std::string::String as $crate::__private::sqlx::Type<DB>>::type_info()
            }

            fn compatible(ty: &<DB as $crate::__private::sqlx::Database>::TypeInfo) -> bool {
                <::std::string::String as $crate::__private::sqlx::Type<DB>>::compatible(ty)
            }
        }

        impl<'q, DB> $crate::__private::sqlx::Encode<'q, DB> for $name
        where
            DB: $crate::__private::sqlx::Database,
            ::std::string::String: $crate::__private::sqlx::Encode<'q, DB>,
        {
            fn encode_by_ref(
                &self,
                buf: &mut <DB as $crate::__private::sqlx::Database>::ArgumentBuffer<'q>,
            ) -> ::std::result::Result<
                $crate::__private::sqlx::encode::IsNull,
                $crate::__private::sqlx::error::BoxDynError,
            > {
                let text = $crate::convert::ValueConverter::to_provider(
                    &$crate::convert::StringConverter::<$name>::new(),
                    self,
                );
                <::std::string::String as $crate::__private::sqlx::Encode<'q, DB>>::encode(text, buf)
            }
        }

        impl<'r, DB> $crate::__private::sqlx::Decode<'r, DB> for $name
        where
            DB: $crate::__private::sqlx::Database,
            &'r str: $crate::__private::sqlx::Decode<'r, DB>,
        {
            fn decode(
                value: <DB as $crate::__private::sqlx::Database>::ValueRef<'r>,
            ) -> ::std::result::Result<Self, $crate::__private::sqlx::error::BoxDynError> {
                let text = <&'r str as $crate::__private::sqlx::Decode<'r, DB>>::decode(value)?;
                let id = $crate::convert::StringConverter::<$name>::new().from_provider_str(text)?;
                ::std::result::Result::Ok(id)
            }
        }
    };
}

#[cfg(not(feature = "sqlx"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __impl_sqlx {
    ($name:ty) => {};
}
