//! Template registry with `{{variable}}` substitution
//!
//! Templates are process-wide, read-only, and loaded once at construction.
//! Substitution is literal, non-recursive, and case-sensitive.

use std::collections::HashMap;

use crate::error::ApplicationError;

/// Built-in hospitality templates, available in every registry
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "booking_welcome",
        "Hello {{guest.name}}! Welcome to {{property.name}}. Your booking is confirmed \
         and we look forward to hosting you. Reply to this message any time if you \
         need assistance.",
    ),
    (
        "booking_confirmation",
        "Dear {{guest.name}}, your booking at {{property.name}} from {{booking.check_in}} \
         to {{booking.check_out}} is confirmed. Booking reference: {{booking.reference}}.",
    ),
    (
        "checkin_instructions",
        "Hi {{guest.name}}, check-in at {{property.name}} opens at {{property.check_in_time}}. \
         Your room is {{booking.room}}. Please have your ID ready at reception.",
    ),
    (
        "checkout_reminder",
        "Good morning {{guest.name}}! A friendly reminder that checkout at \
         {{property.name}} is at {{property.check_out_time}}. We hope you enjoyed \
         your stay.",
    ),
    (
        "payment_receipt",
        "Dear {{guest.name}}, we received your payment of {{payment.amount}} for booking \
         {{booking.reference}}. Thank you for staying at {{property.name}}.",
    ),
];

/// Fixed mapping from template name to a body with `{{key}}` placeholders
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, String>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TemplateRegistry {
    /// Create a registry containing only the built-in hospitality templates
    pub fn with_builtins() -> Self {
        let templates = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, body)| ((*name).to_string(), (*body).to_string()))
            .collect();
        Self { templates }
    }

    /// Create an empty registry (custom template sets, tests)
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Register or replace a template
    pub fn register(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.templates.insert(name.into(), body.into());
    }

    /// All registered template names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }

    /// Raw body of a template, if registered
    pub fn body(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Render a template, substituting `{{key}}` placeholders from `variables`.
    ///
    /// Substitution is literal, non-recursive, and case-sensitive. Any
    /// `{{key}}` with no matching variable is passed through verbatim -
    /// a deliberate compatibility choice, not an error. Unknown template
    /// names fail with [`ApplicationError::TemplateNotFound`] listing every
    /// registered name.
    pub fn render(
        &self,
        name: &str,
        variables: &HashMap<String, String>,
    ) -> Result<String, ApplicationError> {
        let body = self
            .templates
            .get(name)
            .ok_or_else(|| ApplicationError::TemplateNotFound {
                name: name.to_string(),
                known: self.names(),
            })?;

        // Single left-to-right pass: values are never re-scanned, so a
        // substituted value that looks like a placeholder stays literal.
        let mut rendered = String::with_capacity(body.len());
        let mut rest = body.as_str();
        while let Some(start) = rest.find("{{") {
            rendered.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            if let Some(end) = after.find("}}") {
                let key = &after[..end];
                match variables.get(key) {
                    Some(value) => rendered.push_str(value),
                    None => {
                        rendered.push_str("{{");
                        rendered.push_str(key);
                        rendered.push_str("}}");
                    },
                }
                rest = &after[end + 2..];
            } else {
                rendered.push_str(&rest[start..]);
                rest = "";
            }
        }
        rendered.push_str(rest);
        Ok(rendered)
    }
}
