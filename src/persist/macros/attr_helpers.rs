#[macro_export]
#[doc(hidden)]
macro_rules! __persist_field_name {
    ($fallback:expr;) => {
        $fallback
    };
    ($fallback:expr; #[persist($($args:tt)*)] $($rest:tt)*) => {
        $crate::__persist_attr_rename!($fallback; [$($args)*] $($rest)*)
    };
    ($fallback:expr; #[ $($other:tt)* ] $($rest:tt)*) => {
        $crate::__persist_field_name!($fallback; $($rest)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __persist_attr_rename {
    ($fallback:expr; [] $($rest:tt)*) => {
        $crate::__persist_field_name!($fallback; $($rest)*)
    };
    ($fallback:expr; [rename = $name:literal $(, $($args:tt)*)?] $($rest:tt)*) => {
        $name
    };
    ($fallback:expr; [$key:ident $(= $value:tt)? $(, $($args:tt)*)?] $($rest:tt)*) => {
        $crate::__persist_attr_rename!($fallback; [$($($args)*)?] $($rest)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __persist_field_setter {
    ($owner:ty, $field:expr;) => {
        $field
    };
    ($owner:ty, $field:expr; #[persist($($args:tt)*)] $($rest:tt)*) => {
        $crate::__persist_attr_setter!($owner, $field; [$($args)*] $($rest)*)
    };
    ($owner:ty, $field:expr; #[ $($other:tt)* ] $($rest:tt)*) => {
        $crate::__persist_field_setter!($owner, $field; $($rest)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! __persist_attr_setter {
    ($owner:ty, $field:expr; [] $($rest:tt)*) => {
        $crate::__persist_field_setter!($owner, $field; $($rest)*)
    };
    ($owner:ty, $field:expr; [setter = $setter:ident $(, $($args:tt)*)?] $($rest:tt)*) => {
        $field.setter(::std::stringify!($setter), <$owner>::$setter)
    };
    ($owner:ty, $field:expr; [$key:ident $(= $value:tt)? $(, $($args:tt)*)?] $($rest:tt)*) => {
        $crate::__persist_attr_setter!($owner, $field; [$($($args)*)?] $($rest)*)
    };
}
