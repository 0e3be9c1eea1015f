//! Default prompt renderer.
//!
//! Produces the `<request>` XML document the coding agent expects: the user
//! goal, the page URL, the selected elements (or a note that none were
//! selected), plugin contexts, inspiration components and the runtime error.

use async_trait::async_trait;
use chrono::SecondsFormat;
use minijinja::{Environment, context};
use promptbar_core::error::{Result, ToolbarError};
use promptbar_core::prompt::{PromptAssembly, PromptRenderer};
use promptbar_core::session::ElementRef;
use serde::Serialize;

const TEMPLATE_NAME: &str = "request";
const MAX_TEXT_CHARS: usize = 100;

const REQUEST_TEMPLATE: &str = r#"<request>
  <user_goal>{{ user_goal }}</user_goal>
  <url>{{ url }}</url>
{% if elements %}
  <selected_elements>
{% for el in elements %}
    <element index="{{ loop.index }}">
      <tag>{{ el.tag }}</tag>
{% if el.id %}
      <id>{{ el.id }}</id>
{% endif %}
{% if el.classes %}
      <classes>{{ el.classes }}</classes>
{% endif %}
{% if el.attributes %}
      <attributes>
{% for attr in el.attributes %}
        <{{ attr.name }}>{{ attr.value }}</{{ attr.name }}>
{% endfor %}
      </attributes>
{% endif %}
{% if el.text %}
      <text>{{ el.text }}</text>
{% endif %}
      <structural_context>
{% if el.parent %}
        <parent>
          <tag>{{ el.parent.tag }}</tag>
{% if el.parent.id %}
          <id>{{ el.parent.id }}</id>
{% endif %}
{% if el.parent.classes %}
          <classes>{{ el.parent.classes }}</classes>
{% endif %}
        </parent>
{% else %}
        <parent>No parent element found (likely root or disconnected)</parent>
{% endif %}
      </structural_context>
    </element>
{% endfor %}
  </selected_elements>
{% else %}
  <context>No specific element was selected on the page. Please analyze the page code in general or ask for clarification.</context>
{% endif %}
{% for plugin in plugins %}
  <plugin_contexts>
    <{{ plugin.pluginName }}>
{% for snippet in plugin.contextSnippets %}
      <{{ snippet.promptContextName }}>{{ snippet.content }}</{{ snippet.promptContextName }}>
{% endfor %}
    </{{ plugin.pluginName }}>
  </plugin_contexts>
{% endfor %}
{% if components %}
  <inspiration_components>
    <instructions>
      The user has selected the following UI components as inspiration or reference for achieving their goal.
      Use their design patterns, styling and structure as inspiration, adapt their code where it fits,
      and build the user's goal on top of them.
    </instructions>
{% for c in components %}
    <component index="{{ loop.index }}">
      <name>{{ c.name }}</name>
      <description>{{ c.description }}</description>
{% if c.install_command %}
      <install_instructions>
{{ c.install_command }}
      </install_instructions>
{% endif %}
    </component>
{% endfor %}
  </inspiration_components>
{% endif %}
{% if runtime_error %}
  <runtime_error>
    <message>{{ runtime_error.message }}</message>
    <file>{{ runtime_error.file }}</file>
    <line>{{ runtime_error.line }}</line>
    <column>{{ runtime_error.column }}</column>
    <timestamp>{{ runtime_error.timestamp }}</timestamp>
{% if runtime_error.stack_trace %}
    <stack_trace>{{ runtime_error.stack_trace }}</stack_trace>
{% endif %}
  </runtime_error>
{% endif %}
</request>"#;

#[derive(Serialize)]
struct AttributeView<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct ParentView {
    tag: String,
    id: Option<String>,
    classes: String,
}

#[derive(Serialize)]
struct ElementView<'a> {
    tag: &'a str,
    id: Option<&'a str>,
    classes: String,
    attributes: Vec<AttributeView<'a>>,
    text: Option<String>,
    parent: Option<ParentView>,
}

impl<'a> ElementView<'a> {
    fn new(element: &'a ElementRef) -> Self {
        let classes = element.classes.join(", ");
        let attributes = element
            .attributes
            .iter()
            .filter(|(name, _)| !(name.eq_ignore_ascii_case("class") && !classes.is_empty()))
            .map(|(name, value)| AttributeView { name, value })
            .collect();

        Self {
            tag: &element.tag,
            id: element.dom_id.as_deref().filter(|id| !id.is_empty()),
            classes,
            attributes,
            text: element
                .inner_text
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(truncate_text),
            parent: element.parent.as_ref().map(|parent| ParentView {
                tag: parent.tag.clone(),
                id: parent.dom_id.clone().filter(|id| !id.is_empty()),
                classes: parent.classes.join(", "),
            }),
        }
    }
}

#[derive(Serialize)]
struct ComponentView<'a> {
    name: &'a str,
    description: &'a str,
    install_command: Option<&'a str>,
}

#[derive(Serialize)]
struct RuntimeErrorView<'a> {
    message: &'a str,
    file: &'a str,
    line: u32,
    column: u32,
    timestamp: String,
    stack_trace: Option<&'a str>,
}

fn truncate_text(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Goal used when the user submitted no text of their own.
fn fallback_user_goal(has_elements: bool, has_components: bool) -> &'static str {
    match (has_elements, has_components) {
        (true, true) => {
            "You have html components that are selected on the website. Please improve their design using the provided inspiration_components as reference and guidance."
        }
        (true, false) => {
            "You have html components that are selected on the website. Please analyze and improve their design and functionality."
        }
        (false, true) => {
            "You have inspiration components available and instructions on how to use them. Combine them based on provided context."
        }
        (false, false) => "Please analyze the given context and generate design for it.",
    }
}

/// Renders prompts with a minijinja template.
pub struct XmlPromptRenderer {
    env: Environment<'static>,
}

impl XmlPromptRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template(TEMPLATE_NAME, REQUEST_TEMPLATE)
            .map_err(|e| ToolbarError::render(e.to_string()))?;
        Ok(Self { env })
    }

    /// Renders `assembly` synchronously.
    pub fn render(&self, assembly: &PromptAssembly) -> Result<String> {
        let goal = assembly.text.trim();
        let user_goal = if goal.is_empty() {
            fallback_user_goal(
                !assembly.dom_elements.is_empty(),
                !assembly.selected_components.is_empty(),
            )
        } else {
            goal
        };

        let elements: Vec<_> = assembly.dom_elements.iter().map(ElementView::new).collect();
        let components: Vec<_> = assembly
            .selected_components
            .iter()
            .map(|c| ComponentView {
                name: &c.name,
                description: c
                    .description
                    .as_deref()
                    .unwrap_or("No description available"),
                install_command: c.install_command.as_deref(),
            })
            .collect();
        let runtime_error = assembly.runtime_error.as_ref().map(|e| RuntimeErrorView {
            message: &e.message,
            file: &e.source_file,
            line: e.line,
            column: e.column,
            timestamp: e.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            stack_trace: e.stack_trace.as_deref(),
        });

        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| ToolbarError::render(e.to_string()))?;
        let rendered = template
            .render(context! {
                user_goal => user_goal,
                url => &assembly.url,
                elements => elements,
                plugins => &assembly.plugin_snippets,
                components => components,
                runtime_error => runtime_error,
            })
            .map_err(|e| ToolbarError::render(e.to_string()))?;

        Ok(rendered.trim().to_string())
    }
}

#[async_trait]
impl PromptRenderer for XmlPromptRenderer {
    async fn assemble(&self, assembly: &PromptAssembly) -> Result<String> {
        self.render(assembly)
    }
}
