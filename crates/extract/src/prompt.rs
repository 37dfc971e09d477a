use crate::schema::Axis;

pub fn build_extraction_prompt(responses: &str) -> String {
    format!(
        r#"You are a helpful assistant that extracts activities from user responses.

Given the following user responses to various open-ended questions about anxiety, relaxation, loneliness, and methods to reduce loneliness, extract a list of UNIQUE, short, and concise activities that based on the user's responses the user would likely enjoy. They NEED to be similar activities to those mentioned. Each activity name should be no longer than 3-5 words.

RULES:
- Output one activity per line, each line starting with "- "
- Do not repeat an activity
- No explanations, no headings

### User Responses:

{responses}

### Extracted Activities:
- "#
    )
}

/// Pair prompt for one activity on the given axis.
pub fn build_pair_prompt(activity: &str, axis: Axis) -> String {
    match axis {
        Axis::StressRelax => build_stress_relax_prompt(activity),
        Axis::SolitarySocial => build_solitary_social_prompt(activity),
    }
}

pub fn build_stress_relax_prompt(activity: &str) -> String {
    format!(
        r#"You are a creative assistant that generates two concise variants of the **SAME** activity: one more stressful and one more relaxed. Ensure that both variants are clearly related to the original activity and do not include numbering or bullet points.

Given the activity "{activity}", provide:
- **Option_A**: A more stressful version of the activity.
- **Option_B**: A more relaxed version of the activity.

Each activity name should be short and concise, ideally no longer than 3-5 words.

### Activity Pair:
Option_A:
Option_B: "#
    )
}

pub fn build_solitary_social_prompt(activity: &str) -> String {
    format!(
        r#"You are a creative assistant that generates two concise variants of the **SAME** activity: one solitary and one social. Ensure that both variants are clearly related to the original activity and do not include numbering or bullet points.

Given the activity "{activity}", provide:
- **Option_A**: A solitary version of the activity.
- **Option_B**: A social version of the activity.

Each activity name should be short and concise, ideally no longer than 3-5 words.

### Activity Pair:
Option_A:
Option_B: "#
    )
}

pub fn build_question_prompt(option_a: &str, option_b: &str) -> String {
    format!(
        r#"You are a survey designer. Given two versions of an activity, create a clear, concise and neutral survey question asking the respondent to choose between them. Keep both options exactly as written.

### Activity Pair:
- Option A: {option_a}
- Option B: {option_b}

### Survey Question:
Which of the following would you prefer?
A) {option_a}
B) {option_b}
"#
    )
}

pub fn build_pair_to_json_prompt(pair_text: &str) -> String {
    format!(
        r#"You are given an activity pair in text format. Extract the two activities and output them in **valid JSON format** with keys "Option_A" and "Option_B". Ensure the JSON is correctly formatted. Output only the JSON object.

### Activity Pair:

{pair_text}

### Example Input:

- Stressful Activity: Giving a speech
- Relaxing Activity: Reading a book

### Example JSON Output:

{{
    "Option_A": "Giving a speech",
    "Option_B": "Reading a book"
}}

### Your JSON Output:
"#
    )
}

/// Fixed question rendering, used when the composer gets nothing back.
pub fn render_question_template(option_a: &str, option_b: &str) -> String {
    format!("Which of the following would you prefer?\nA) {option_a}\nB) {option_b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted_verbatim() {
        let prompt = build_extraction_prompt("- Yoga\n- {weird} input");
        assert!(prompt.contains("- Yoga\n- {weird} input"));

        let prompt = build_pair_prompt("Gardening", Axis::StressRelax);
        assert!(prompt.contains("\"Gardening\""));
        assert!(prompt.contains("more stressful"));

        let prompt = build_pair_prompt("Gardening", Axis::SolitarySocial);
        assert!(prompt.contains("solitary version"));
    }

    #[test]
    fn question_prompt_embeds_both_options() {
        let prompt = build_question_prompt("Solo hike", "Group hike");
        assert!(prompt.contains("A) Solo hike"));
        assert!(prompt.contains("B) Group hike"));
    }

    #[test]
    fn conversion_prompt_keeps_literal_braces() {
        let prompt = build_pair_to_json_prompt("Option_A: x");
        assert!(prompt.contains("{\n    \"Option_A\": \"Giving a speech\""));
        assert!(prompt.contains("Option_A: x"));
    }

    #[test]
    fn conversion_example_puts_stressful_variant_first() {
        let prompt = build_pair_to_json_prompt("Option_A: x");
        let example = &prompt[prompt.find("### Example JSON Output:").unwrap()..];

        let a = example.find("\"Option_A\": \"Giving a speech\"").unwrap();
        let b = example.find("\"Option_B\": \"Reading a book\"").unwrap();
        assert!(a < b);
        assert!(prompt.contains("- Stressful Activity: Giving a speech"));
    }

    #[test]
    fn template_rendering_has_both_labels() {
        let question = render_question_template("Cooking alone", "Dinner party");
        assert!(question.contains("A) Cooking alone"));
        assert!(question.contains("B) Dinner party"));
    }
}
