//! Bean-name convention derived from type names.
//!
//! A constructor parameter is wired to the bean whose name is the simple
//! (unqualified) name of the parameter's declared type with its first
//! character lower-cased. `my_app::repository::RepoBean` resolves to the bean
//! named `repoBean`. There is no alias or override: renaming a type renames
//! the bean it binds to.

/// Strips module paths and generic arguments from a `std::any::type_name` result.
///
/// Trait objects are named after their principal trait; auto-trait and
/// lifetime bounds are dropped, as is a leading reference.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::naming::simple_type_name;
///
/// assert_eq!(simple_type_name("my_app::repository::RepoBean"), "RepoBean");
/// assert_eq!(simple_type_name("my_app::Cache<alloc::string::String>"), "Cache");
/// assert_eq!(simple_type_name("dyn my_app::Repository"), "Repository");
/// assert_eq!(
///     simple_type_name("dyn my_app::Repository + core::marker::Send + core::marker::Sync"),
///     "Repository"
/// );
/// assert_eq!(simple_type_name("&mut my_app::RepoBean"), "RepoBean");
/// assert_eq!(simple_type_name("RepoBean"), "RepoBean");
/// ```
pub fn simple_type_name(type_name: &str) -> &str {
    let base = match type_name.find('<') {
        Some(idx) => &type_name[..idx],
        None => type_name,
    };
    let base = base.trim_start();
    let base = base
        .strip_prefix("&mut ")
        .or_else(|| base.strip_prefix('&'))
        .unwrap_or(base)
        .trim_start_matches('(');
    let base = base.strip_prefix("dyn ").unwrap_or(base);
    // Principal trait of `dyn A + Send + 'static`
    let base = match base.find(" + ") {
        Some(idx) => &base[..idx],
        None => base.trim_end_matches(')'),
    };
    match base.rfind("::") {
        Some(idx) => &base[idx + 2..],
        None => base,
    }
}

/// Lower-cases the first character and leaves the rest unchanged.
///
/// ```rust
/// use ferrous_ioc::naming::decapitalize;
///
/// assert_eq!(decapitalize("RepoBean"), "repoBean");
/// assert_eq!(decapitalize("URLCache"), "uRLCache");
/// assert_eq!(decapitalize("repoBean"), "repoBean");
/// assert_eq!(decapitalize(""), "");
/// ```
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Bean name a parameter of type `T` resolves to.
///
/// ```rust
/// use ferrous_ioc::naming::bean_name_for;
///
/// struct RepoBean;
/// assert_eq!(bean_name_for::<RepoBean>(), "repoBean");
/// ```
pub fn bean_name_for<T: ?Sized + 'static>() -> String {
    bean_name_for_type_name(std::any::type_name::<T>())
}

/// Bean name derived from a full type name.
pub fn bean_name_for_type_name(type_name: &str) -> String {
    decapitalize(simple_type_name(type_name))
}
