//! Client-side validation for contact forms and the simulated submit.
//!
//! Fields are validated on blur, again on every input while they are marked
//! invalid, and all together on submit. A valid submit never reaches the
//! network: the button switches to a sending state and the page moves to the
//! confirmation URL after a short delay.

pub mod rules;

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info};

use crate::config::SiteConfig;
use crate::dom::{EventKind, Host, Target, View};
use crate::registry::{Behavior, InitRegistry};
use rules::{FieldInput, FieldValidation, RuleTable, PRIVACY_MESSAGE};

const FORM_SELECTOR: &str = ".c-form, form";
const FIELD_SELECTOR: &str = "input, textarea, select";
const ERROR_SELECTOR: &str = ".invalid-feedback, .c-form__error";
const PRIVACY_ERROR_SELECTOR: &str = ".invalid-feedback";
const PRIVACY_SELECTOR: &str = "input[name=\"privacyConsent\"], input[name=\"privacy\"], input[id=\"privacyConsent\"], input[id=\"privacy\"]";
const SUBMIT_SELECTOR: &str = "button[type=\"submit\"]";
const INVALID_CLASS: &str = "is-invalid";
const ERROR_CLASS: &str = "invalid-feedback";
const SENDING_LABEL: &str =
    "<span class=\"spinner-border spinner-border-sm me-2\"></span>Wird gesendet...";

pub struct FormEngine<H: Host> {
    host: Rc<H>,
    rules: RuleTable,
    submit_delay_ms: u32,
    confirmation_url: String,
}

impl<H: Host> FormEngine<H> {
    pub fn new(host: Rc<H>, config: &SiteConfig) -> Self {
        Self {
            host,
            rules: RuleTable::new(),
            submit_delay_ms: config.form.submit_delay_ms,
            confirmation_url: config.form.confirmation_url.clone(),
        }
    }

    fn read_field(&self, field: &H::Node) -> FieldInput {
        let host = &self.host;
        FieldInput {
            name: host.attribute(field, "name"),
            id: host.attribute(field, "id"),
            value: host.field_value(field),
            required: host.has_attribute(field, "required"),
        }
    }

    /// Validates one control and renders the outcome next to it.
    ///
    /// A field that is already valid is left untouched.
    pub fn validate_field(&self, field: &H::Node) -> bool {
        let host = &self.host;
        let parent = host.parent(field);
        match self.rules.validate(&self.read_field(field)) {
            FieldValidation::Invalid(message) => {
                host.add_class(field, INVALID_CLASS);
                if let Some(error) = parent.and_then(|p| self.error_element(&p, ERROR_SELECTOR, true)) {
                    host.set_text(&error, message);
                }
                false
            }
            FieldValidation::Valid => {
                if host.has_class(field, INVALID_CLASS) {
                    host.remove_class(field, INVALID_CLASS);
                }
                if let Some(error) = parent.and_then(|p| self.error_element(&p, ERROR_SELECTOR, false)) {
                    if !host.text(&error).is_empty() {
                        host.set_text(&error, "");
                    }
                }
                true
            }
        }
    }

    /// The first error container under `parent`, created on demand.
    fn error_element(&self, parent: &H::Node, selector: &str, create: bool) -> Option<H::Node> {
        let host = &self.host;
        if let Some(existing) = host.query_within(parent, selector).into_iter().next() {
            return Some(existing);
        }
        if !create {
            return None;
        }
        let error = host.create_element("div")?;
        host.add_class(&error, ERROR_CLASS);
        host.append_child(parent, &error);
        Some(error)
    }

    /// Returns the consent checkbox when it exists and is unchecked.
    fn check_privacy(&self, form: &H::Node) -> Option<H::Node> {
        let host = &self.host;
        let checkbox = host.query_within(form, PRIVACY_SELECTOR).into_iter().next()?;
        let parent = host.parent(&checkbox)?;
        if host.is_checked(&checkbox) {
            if let Some(error) = self.error_element(&parent, PRIVACY_ERROR_SELECTOR, false) {
                if host.text(&error) == PRIVACY_MESSAGE {
                    host.set_text(&error, "");
                }
            }
            return None;
        }
        let error = match host.query_within(&parent, PRIVACY_ERROR_SELECTOR).into_iter().next() {
            Some(existing) => existing,
            None => {
                let error = self.error_element(&parent, PRIVACY_ERROR_SELECTOR, true)?;
                host.set_style(&error, "display", "block");
                error
            }
        };
        host.set_text(&error, PRIVACY_MESSAGE);
        Some(checkbox)
    }

    /// Validates every control of `form`; true when the form may be sent.
    pub fn validate_form(&self, form: &H::Node) -> bool {
        let host = &self.host;
        let mut valid = true;
        for field in host.query_within(form, FIELD_SELECTOR) {
            // no short-circuit: every field shows its own message
            valid &= self.validate_field(&field);
        }
        let unchecked_privacy = self.check_privacy(form);
        if unchecked_privacy.is_some() {
            valid = false;
        }
        if !valid {
            let first_invalid = host
                .query_within(form, &format!(".{INVALID_CLASS}"))
                .into_iter()
                .next()
                .or(unchecked_privacy);
            if let Some(field) = first_invalid {
                host.focus(&field);
                host.scroll_into_view(&field);
            }
        }
        valid
    }

    fn send(self: &Rc<Self>, form: &H::Node) {
        let host = &self.host;
        if let Some(button) = host.query_within(form, SUBMIT_SELECTOR).into_iter().next() {
            host.set_attribute(&button, "disabled", "");
            host.set_inner_html(&button, SENDING_LABEL);
            host.set_style(&button, "opacity", "0.7");
        }
        info!("Form valid, redirecting to {}", self.confirmation_url);
        let engine = Rc::clone(self);
        host.set_timeout(
            self.submit_delay_ms,
            Box::new(move || engine.host.navigate(&engine.confirmation_url)),
        );
    }
}

pub fn init<H: Host>(host: &Rc<H>, registry: &InitRegistry, config: &SiteConfig) {
    if !registry.claim(Behavior::FormValidation) {
        return;
    }
    let forms = host.query_all(FORM_SELECTOR);
    if forms.is_empty() {
        debug!("No forms to validate");
        return;
    }
    let engine = Rc::new(FormEngine::new(Rc::clone(host), config));

    for form in &forms {
        for field in host.query_within(form, FIELD_SELECTOR) {
            {
                let engine = Rc::clone(&engine);
                let field = field.clone();
                host.on(Target::Node(field.clone()), EventKind::Blur, move |_| {
                    engine.validate_field(&field);
                });
            }
            let engine = Rc::clone(&engine);
            host.on(Target::Node(field.clone()), EventKind::Input, move |_| {
                if engine.host.has_class(&field, INVALID_CLASS) {
                    engine.validate_field(&field);
                }
            });
        }

        let engine = Rc::clone(&engine);
        let form_node = form.clone();
        let pending = Cell::new(false);
        host.on(Target::Node(form.clone()), EventKind::Submit, move |e| {
            e.prevent_default();
            e.stop_propagation();
            if pending.get() {
                return;
            }
            if !engine.validate_form(&form_node) {
                debug!("Form submit blocked by validation");
                return;
            }
            pending.set(true);
            engine.send(&form_node);
        });
    }
    debug!("Validation wired on {} forms", forms.len());
}
