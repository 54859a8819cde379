use chrono::{DateTime, Local};
use colored::Colorize;
use serde_json::{Map, Value};
use tracing::Level;

/// Line template shared by the file and console sinks.
pub const DEFAULT_TEMPLATE: &str =
    "[{{datetime}}] [{{level}}] [{{scope}}] {{message}} {{data}} {{extra}}\n";

const DATETIME_FORMAT: &str = "%Y/%m/%dT%H:%M:%S%.3f";

/// One log record, ready to be rendered by a [`TextFormatter`].
#[derive(Debug, Clone)]
pub struct Record {
    pub datetime: DateTime<Local>,
    pub level: Level,
    pub scope: String,
    pub message: String,
    pub data: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(level: Level, scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            datetime: Local::now(),
            level,
            scope: scope.into(),
            message: message.into(),
            data: Map::new(),
            extra: Map::new(),
        }
    }
}

/// Renders records through a `{{placeholder}}` template.
///
/// Known placeholders are `datetime`, `level`, `scope`, `message`, `data`
/// and `extra`. Anything else is copied to the output untouched.
#[derive(Debug, Clone)]
pub struct TextFormatter {
    template: String,
    color: bool,
}

impl TextFormatter {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn format(&self, record: &Record) -> String {
        let mut out = String::with_capacity(self.template.len() + record.message.len() + 64);
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };

            let name = &after[..end];
            match self.field(name, record) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[start..start + end + 4]),
            }
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        out
    }

    fn field(&self, name: &str, record: &Record) -> Option<String> {
        let value = match name {
            "datetime" => record.datetime.format(DATETIME_FORMAT).to_string(),
            "level" => self.paint(record.level.as_str(), record.level),
            "scope" => record.scope.clone(),
            "message" => self.paint(&record.message, record.level),
            "data" => render_object(&record.data),
            "extra" => render_object(&record.extra),
            _ => return None,
        };
        Some(value)
    }

    fn paint(&self, text: &str, level: Level) -> String {
        if !self.color {
            return text.to_string();
        }
        let painted = match level {
            Level::ERROR => text.bright_red(),
            Level::WARN => text.bright_yellow(),
            Level::INFO => text.bright_green(),
            Level::DEBUG => text.bright_cyan(),
            _ => text.dimmed(),
        };
        painted.to_string()
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

fn render_object(map: &Map<String, Value>) -> String {
    Value::Object(map.clone()).to_string()
}
