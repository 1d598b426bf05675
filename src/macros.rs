/// Build an [`Attributes`](crate::domain::Attributes) map from
/// `name => value` pairs. Values go through `Into<AttrValue>`.
///
/// ```
/// use flowtree::attrs;
///
/// let attrs = attrs! { "text" => "Save", "enabled" => false };
/// assert_eq!(attrs.len(), 2);
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::domain::Attributes::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut attrs = $crate::domain::Attributes::new();
        $(
            attrs.insert(
                ::std::string::String::from($name),
                $crate::domain::AttrValue::from($value),
            );
        )+
        attrs
    }};
}
