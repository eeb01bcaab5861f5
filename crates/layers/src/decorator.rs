use scene::entity::{LabelVisual, MapEntity, TextField, Visual};

use crate::symbology::{KindStyle, style_for};

/// Attaches label, marker and info-popup description to loaded entities.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decorator;

impl Decorator {
    pub fn new() -> Self {
        Self
    }

    pub fn visual_for(&self, entity: &MapEntity) -> Visual {
        let style = style_for(entity.kind());
        Visual {
            marker: style.marker.clone(),
            label: label_for(entity, &style),
            description: describe(entity),
        }
    }

    pub fn decorate(&self, entity: &mut MapEntity) {
        entity.visual = self.visual_for(entity);
    }

    /// Decorates in row order.
    pub fn decorate_all(&self, entities: &mut [MapEntity]) {
        for e in entities {
            self.decorate(e);
        }
    }
}

fn label_for(entity: &MapEntity, style: &KindStyle) -> Option<LabelVisual> {
    if !style.show_label || entity.name.trim().is_empty() {
        return None;
    }
    Some(LabelVisual {
        text: entity.name.clone(),
        font_size_px: style.font_size_px,
        fill_color: style.fill_color,
        outline_color: style.outline_color,
        outline_width_px: style.outline_width_px,
        pixel_offset_y: style.pixel_offset_y,
        max_display_distance_m: style.max_display_distance_m,
    })
}

/// Info popup body: one table row per text field, then extra properties.
pub fn describe(entity: &MapEntity) -> String {
    let mut html = String::from("<table class=\"info-table\"><tbody>");
    for field in TextField::ALL {
        if field == TextField::Name {
            continue;
        }
        if let Some(value) = entity.text(field) {
            push_row(&mut html, field.label(), value);
        }
    }
    for (k, v) in &entity.extra {
        push_row(&mut html, k, v);
    }
    html.push_str("</tbody></table>");
    html
}

fn push_row(html: &mut String, key: &str, value: &str) {
    html.push_str("<tr><th>");
    html.push_str(&escape_html(key));
    html.push_str("</th><td>");
    html.push_str(&escape_html(value));
    html.push_str("</td></tr>");
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
