// prompt.rs

/// Builds the image generation prompt from product details. Inputs are
/// interpolated as-is, no escaping or truncation.
pub fn build_prompt(name: &str, description: &str) -> String {
    format!(
        "High-quality e-commerce product photo of '{}'. Product details: {}. \
         Clean white background, studio lighting. Realistic style.",
        name, description
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_name_and_description() {
        let prompt = build_prompt("Mug", "Red ceramic mug");
        assert!(prompt.contains("'Mug'"));
        assert!(prompt.contains("Red ceramic mug"));
        assert!(prompt.contains("white background"));
    }

    #[test]
    fn deterministic_for_same_inputs() {
        assert_eq!(
            build_prompt("Lamp", "Brass desk lamp"),
            build_prompt("Lamp", "Brass desk lamp")
        );
    }

    #[test]
    fn empty_description_passes_through() {
        let prompt = build_prompt("Lamp", "");
        assert!(prompt.contains("Product details: ."));
    }
}
