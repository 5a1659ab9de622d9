//! Per-kind title and message templates.

use super::{NotificationDomainError, NotificationEvent, NotificationKind};
use minijinja::Environment;
use serde_json::{Map, Value};

/// Title and message rendered for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
}

const fn templates(kind: NotificationKind) -> (&'static str, &'static str) {
    match kind {
        NotificationKind::TaskAssigned => (
            "Assigned: {{ subject }}",
            "{{ actor }} assigned you to \"{{ subject }}\".",
        ),
        NotificationKind::ReviewRequested => (
            "Review requested: {{ subject }}",
            "{{ actor }} submitted \"{{ subject }}\" for review.",
        ),
        NotificationKind::ReviewCompleted => (
            "Review completed: {{ subject }}",
            "{{ actor }} reviewed \"{{ subject }}\"{% if detail %}: {{ detail }}{% endif %}.",
        ),
        NotificationKind::CommentAdded => (
            "New comment on {{ subject }}",
            "{{ actor }} commented on \"{{ subject }}\"{% if detail %}: {{ detail }}{% endif %}",
        ),
        NotificationKind::DocumentUploaded => (
            "New document on {{ subject }}",
            "{{ actor }} uploaded {% if detail %}\"{{ detail }}\"{% else %}a document{% endif %} \
             to \"{{ subject }}\".",
        ),
        NotificationKind::NoteAdded => (
            "New note on {{ subject }}",
            "{{ actor }} added a note to \"{{ subject }}\"{% if detail %}: {{ detail }}{% endif %}",
        ),
        NotificationKind::TodoCompleted => (
            "To-do completed on {{ subject }}",
            "{{ actor }} completed {% if detail %}\"{{ detail }}\"{% else %}a to-do{% endif %} \
             on \"{{ subject }}\".",
        ),
        NotificationKind::BulletinPosted => (
            "Bulletin: {{ subject }}",
            "{{ actor }} posted a bulletin{% if detail %}: {{ detail }}{% endif %}",
        ),
        NotificationKind::ProjectUpdated => (
            "Project updated: {{ subject }}",
            "{{ actor }} updated project \"{{ subject }}\"{% if detail %}: {{ detail }}{% endif %}",
        ),
        NotificationKind::ProjectClosed => (
            "Project closed: {{ subject }}",
            "{{ actor }} closed project \"{{ subject }}\".",
        ),
        NotificationKind::ProjectReopened => (
            "Project reopened: {{ subject }}",
            "{{ actor }} reopened project \"{{ subject }}\".",
        ),
    }
}

/// Renders the title and message for `event` as seen by any recipient.
///
/// # Errors
///
/// Returns [`NotificationDomainError::TemplateRender`] when a template
/// fails to render.
pub fn render(
    event: &NotificationEvent,
    actor_name: &str,
) -> Result<RenderedMessage, NotificationDomainError> {
    let (title_template, message_template) = templates(event.kind());
    let environment = Environment::new();
    let context = template_context(event, actor_name);
    let render_one = |template: &str| {
        environment
            .render_str(template, &context)
            .map_err(|error| NotificationDomainError::TemplateRender {
                kind: event.kind(),
                reason: error.to_string(),
            })
    };
    Ok(RenderedMessage {
        title: render_one(title_template)?,
        message: render_one(message_template)?,
    })
}

fn template_context(event: &NotificationEvent, actor_name: &str) -> Map<String, Value> {
    let mut context = Map::new();
    context.insert("actor".to_owned(), Value::String(actor_name.to_owned()));
    context.insert("subject".to_owned(), Value::String(event.label().to_owned()));
    context.insert(
        "detail".to_owned(),
        event
            .detail()
            .map_or(Value::Null, |detail| Value::String(detail.to_owned())),
    );
    context
}
