//! Instruction text sent to the text-generation service.

use std::sync::LazyLock;

use anatomy_primitives::Taxonomy;
use tracing::trace;

use crate::template::{PromptTemplate, TemplateResult};

const COMPONENT_INSTRUCTIONS: &str = r"
# Instruction:
Please carefully analyze the provided prompt and assign each identifiable complete sentence to one of the components listed below. Avoid using phrases or single words unless they form a complete idea. Ensure that each part is distinctly categorized to prevent overlap.
Format the response as a JSON-like dictionary where each key represents a component and the value is the associated text or an empty string if nothing relevant is found. Only return the dictionary.

## Prompt:
'''{{prompt}}'''

## Components Definitions:
{{definitions}}

## Output Format:
Please return the output in the following JSON structure without additional commentary or explanation, and ensure assign unique content to each category to avoid any overlaps:
'''
{{schema}}
'''
";

const PLACEHOLDER_INSTRUCTIONS: &str = r"Based on the following prompt template, classify the placeholder into one of these categories: User Question, Contextual Information, Knowledge Input, Metadata/Short Phrases.
If none of the categories seem appropriate, return 'Others'. Only return one most appropriate category name or 'Others'. Do not return any extra explanation.

### Category:
1. User Question: queries or questions provided by users. Examples: '{question}', '{query}'.
2. Contextual Information: used for background or supplementary input that helps set the stage for the task but is not the primary focus. It includes data that gives additional context to the task or tracks conversational history, user preferences, or prior interactions. These placeholders provide supporting context but are not the main content being processed. Examples: '{chat_history}', '{background_info}', '{previous_conversation}'.
3. Knowledge Input: represents the core content that the prompt directly processes or manipulates. It typically involves factual or knowledge-based information that needs to be analyzed, summarized, or transformed by the model. Examples: '{document}', '{text}', '{code_snippet}'.
4. Metadata/Short Phrases: represents brief inputs or settings that define specific parameters or goals for the task. These placeholders are typically used to adjust or refine the task's instructions, such as setting output requirements, specifying constraints, or defining small details like names or locations. They are short in nature and often used to configure or customize the task's execution, without being the core content or background context. Examples: '{output_format}', '{name}', '{location}', '{task_type}', '{language}', '{timestamp}', '{number}'.
5. Others: any placeholder that does not fit into the above categories.

### Placeholder:
'{{placeholder}}'

### Prompt template:
'{{prompt_template}}'
";

static COMPONENT_TEMPLATE: LazyLock<PromptTemplate> =
    LazyLock::new(|| PromptTemplate::parse(COMPONENT_INSTRUCTIONS));

static PLACEHOLDER_TEMPLATE: LazyLock<PromptTemplate> =
    LazyLock::new(|| PromptTemplate::parse(PLACEHOLDER_INSTRUCTIONS));

/// Returns the definition shown to the model for a built-in component label.
fn component_definition(label: &str) -> Option<&'static str> {
    Some(match label {
        "profile/role" => "Who or what the model is acting as.",
        "directive" => {
            "The core intent of the prompt, often in the form of an instruction or question."
        }
        "workflows" => "Steps and processes the model should follow to complete the task.",
        "context" => "Background information and context that the model needs to refer to.",
        "examples" => "Examples of what the response should look like.",
        "output format/style" => "The type, format, or style of the output.",
        "constraints" => {
            "Restrictions on what the model must adhere to when generating a response."
        }
        "others" => "Any other components that do not fit into the above categories.",
        _ => return None,
    })
}

fn title_case(label: &str) -> String {
    label
        .split_inclusive([' ', '/'])
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect()
}

fn render_definitions(taxonomy: &Taxonomy) -> String {
    taxonomy
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let heading = format!("{}. {}", index + 1, title_case(label));
            match component_definition(label) {
                Some(definition) => format!("{heading}: {definition}"),
                None => heading,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_schema(taxonomy: &Taxonomy) -> String {
    let entries: Vec<String> = taxonomy
        .iter()
        .map(|label| {
            let key = serde_json::Value::from(label).to_string();
            format!("    {key}: \"\"")
        })
        .collect();
    format!("{{\n{}\n}}", entries.join(",\n"))
}

/// Builds the component classification request for `prompt`.
///
/// # Errors
///
/// Returns a [`crate::TemplateError`] if the instruction template cannot be
/// rendered.
pub fn component_request(prompt: &str, taxonomy: &Taxonomy) -> TemplateResult<String> {
    let definitions = render_definitions(taxonomy);
    let schema = render_schema(taxonomy);
    let request = COMPONENT_TEMPLATE.render(&[
        ("prompt", prompt),
        ("definitions", &definitions),
        ("schema", &schema),
    ])?;
    trace!(bytes = request.len(), "rendered component request");
    Ok(request)
}

/// Builds the classification request for one placeholder of `prompt_template`.
///
/// # Errors
///
/// Returns a [`crate::TemplateError`] if the instruction template cannot be
/// rendered.
pub fn placeholder_request(placeholder: &str, prompt_template: &str) -> TemplateResult<String> {
    let request = PLACEHOLDER_TEMPLATE.render(&[
        ("placeholder", placeholder),
        ("prompt_template", prompt_template),
    ])?;
    trace!(placeholder, bytes = request.len(), "rendered placeholder request");
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_request_embeds_prompt_and_taxonomy() {
        let request =
            component_request("You are a {{role}}. Answer briefly.", &Taxonomy::components())
                .unwrap();

        assert!(request.contains("'''You are a {{role}}. Answer briefly.'''"));
        assert!(request.contains("1. Profile/Role: Who or what the model is acting as."));
        assert!(request.contains("6. Output Format/Style: The type, format, or style"));
        assert!(request.contains("    \"output format/style\": \"\","));
        assert!(request.contains("    \"others\": \"\"\n}"));
    }

    #[test]
    fn custom_taxonomy_labels_render_without_definition() {
        let taxonomy = Taxonomy::new(["persona", "task"]).unwrap();
        let request = component_request("x", &taxonomy).unwrap();
        assert!(request.contains("1. Persona\n2. Task\n"));
        assert!(request.contains("\"task\": \"\""));
    }

    #[test]
    fn placeholder_request_keeps_literal_tokens() {
        let request =
            placeholder_request("{{question}}", "Answer {{question}} using {context}").unwrap();

        assert!(request.contains("### Placeholder:\n'{{question}}'"));
        assert!(request.contains("'Answer {{question}} using {context}'"));
        assert!(request.contains("Examples: '{question}', '{query}'."));
    }

    #[test]
    fn instruction_templates_expose_expected_slots() {
        assert_eq!(
            COMPONENT_TEMPLATE.slots(),
            vec!["prompt", "definitions", "schema"]
        );
        assert_eq!(
            PLACEHOLDER_TEMPLATE.slots(),
            vec!["placeholder", "prompt_template"]
        );
    }

    #[test]
    fn definitions_are_one_line_per_label() {
        let definitions = render_definitions(&Taxonomy::components());
        let lines: Vec<&str> = definitions.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(
            lines[1],
            "2. Directive: The core intent of the prompt, often in the form of an instruction or question."
        );
        assert!(lines[7].starts_with("8. Others: "));
        assert!(!definitions.ends_with('\n'));
    }

    #[test]
    fn title_case_handles_separators() {
        assert_eq!(title_case("output format/style"), "Output Format/Style");
        assert_eq!(title_case("others"), "Others");
    }
}
