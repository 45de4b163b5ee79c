/// Token in the prompt template that is replaced by the item name.
pub const INGREDIENT_PLACEHOLDER: &str = "{ingredient}";

/// With an extracted style the name is joined with it and nothing else, so the
/// style alone decides the look. Without one, the template decides.
pub fn build_prompt(name: &str, style: Option<&str>, template: &str) -> String {
    match style {
        Some(style) => format!("{name}, {style}"),
        None => template.replace(INGREDIENT_PLACEHOLDER, name),
    }
}
