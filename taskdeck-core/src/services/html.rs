//! HTML rendering of the task list view
//!
//! Produces the card markup for embedding in a web page. Every value taken
//! from a task, class hooks included, goes through [`escape_html`].

use crate::services::view::{TaskCard, TaskListBody, TaskListView};

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn render_card(card: &TaskCard) -> String {
    let mut html = format!(
        "<div class=\"task-card priority-{}\" data-task-id=\"{}\">\n",
        escape_html(&card.priority_class),
        card.id
    );
    html.push_str("  <div class=\"task-header\">\n");
    html.push_str(&format!(
        "    <div class=\"task-title\">{}</div>\n",
        escape_html(&card.title)
    ));
    html.push_str(&format!(
        "    <div class=\"task-meta\"><span class=\"task-status {}\">{}</span> <span class=\"task-priority {}\">{}</span></div>\n",
        escape_html(&card.status_class),
        escape_html(&card.status_label),
        escape_html(&card.priority_class),
        escape_html(&card.priority_label)
    ));
    html.push_str("  </div>\n");

    if let Some(description) = &card.description {
        html.push_str(&format!(
            "  <div class=\"task-description\">{}</div>\n",
            escape_html(description)
        ));
    }

    if let Some(deadline) = &card.deadline {
        let class = if deadline.overdue {
            "task-deadline overdue"
        } else {
            "task-deadline"
        };
        html.push_str(&format!(
            "  <div class=\"{}\">Due: {}</div>\n",
            class,
            escape_html(&deadline.text)
        ));
    }

    html.push_str(&format!(
        "  <div class=\"task-actions\"><button data-action=\"edit\">Edit</button> <button data-action=\"toggle\">{}</button> <button data-action=\"delete\">Delete</button></div>\n",
        card.toggle_label
    ));
    html.push_str("</div>\n");
    html
}

/// Render the whole list, or the empty-state placeholder
pub fn render_list(view: &TaskListView) -> String {
    match &view.body {
        TaskListBody::Empty { message } => {
            format!("<div class=\"task-list-empty\"><p>{}</p></div>\n", escape_html(message))
        }
        TaskListBody::Cards { cards } => cards.iter().map(render_card).collect(),
    }
}
