//! HTML placeholder for the asynchronous comment widget.
//!
//! The client-side bundle looks for elements carrying
//! `data-agora-widget="comment_async"` and boots the widget from the JSON in
//! their `data-attributes`.

use agora_core::project::Commentable;

use crate::{
  Error,
  attributes::{CommentAttributes, RequestContext, resolve_attributes},
  settings::CommentSettings,
};

pub const WIDGET_NAME: &str = "comment_async";

/// Escape text for use inside a double- or single-quoted HTML attribute.
pub fn escape_html(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
    .replace('\'', "&#x27;")
}

/// The placeholder element for an already-resolved attribute bag.
pub fn widget_fragment(attributes: &CommentAttributes) -> Result<String, Error> {
  let json = serde_json::to_string(attributes)?;
  Ok(format!(
    "<div data-agora-widget=\"{WIDGET_NAME}\" data-attributes=\"{}\"></div>",
    escape_html(&json)
  ))
}

/// Resolve the widget attributes for the request's viewer and render the
/// placeholder element.
pub fn render_comments_widget(
  ctx: &RequestContext,
  subject: &dyn Commentable,
  with_categories: bool,
  settings: &CommentSettings,
) -> Result<String, Error> {
  let attributes = resolve_attributes(
    &ctx.viewer,
    subject,
    ctx.anchored_comment_id(),
    with_categories,
    settings,
  )?;
  widget_fragment(&attributes)
}

#[cfg(test)]
mod tests {
  use agora_core::{
    content_type::ContentType,
    identity::Viewer,
    project::{Item, Project, Subject},
  };

  use super::*;

  fn subject() -> Subject {
    let ct = ContentType {
      id:        7,
      app_label: "ideas".into(),
      model:     "proposal".into(),
    };
    let mut project = Project::new(3, "Riverside");
    project.id = Some(1);
    let mut item = Item::new(ct, 1, 99, "More benches");
    item.id = Some(42);
    Subject::new(item, project).unwrap()
  }

  #[test]
  fn escapes_attribute_breaking_characters() {
    assert_eq!(
      escape_html(r#"<a href="x">'&'</a>"#),
      "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
    );
  }

  #[test]
  fn renders_single_placeholder_with_escaped_json() {
    let ctx = RequestContext::new(Viewer::Anonymous).with_query("comment", "<17>");
    let html =
      render_comments_widget(&ctx, &subject(), false, &CommentSettings::default())
        .unwrap();

    assert!(html.starts_with(
      "<div data-agora-widget=\"comment_async\" data-attributes=\"{&quot;subjectType&quot;:7,"
    ));
    assert!(html.contains("&quot;anchoredCommentId&quot;:&quot;&lt;17&gt;&quot;"));
    assert!(html.ends_with("\"></div>"));
    assert_eq!(html.matches("<div").count(), 1);
  }

  #[test]
  fn misconfigured_categories_propagate() {
    let ctx = RequestContext::new(Viewer::Anonymous);
    let err = render_comments_widget(&ctx, &subject(), true, &CommentSettings::default())
      .unwrap_err();
    assert!(matches!(
      err,
      Error::Core(agora_core::Error::ImproperlyConfigured(_))
    ));
  }
}
