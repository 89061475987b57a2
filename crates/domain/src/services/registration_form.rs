//! Register form workflow: building, validating and saving registrations.
//!
//! The form is described as data. The HTTP layer renders it, collects a
//! [`FormSubmission`], calls [`validate`] and, when no errors come back,
//! [`prepare_registration`] followed by [`save_outcome`] once stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared::validation::{escape_html, is_external_url, strip_dangerous_protocols};

use crate::error::DomainError;
use crate::models::permission::{self, VIEW_ADMIN_THEME};
use crate::models::{
    Account, HostRef, Registrant, RegistrantType, Registration, RegistrationState, UserRef,
};

use super::access::{can_access_user_profiles, can_edit_state, can_view_registration, is_registration_admin};
use super::clock::Clock;
use super::eligibility::{denial_message, DenialReason};
use super::host_entity::HostEntity;

/// Upper bound for the spaces field when nothing else limits it.
pub const UNBOUNDED_SPACES: i64 = 99_999;

pub const DEFAULT_CONFIRMATION: &str = "The registration was saved.";

const ILLEGAL_CHOICE: &str =
    "An illegal choice has been detected. Please contact the site administrator.";

/// Everything the form needs for one request.
pub struct FormContext<'a> {
    pub host: &'a HostEntity,
    pub actor: &'a Account,
    /// The registration being edited. `None` on the register page.
    pub registration: Option<&'a Registration>,
    pub clock: &'a dyn Clock,
}

impl FormContext<'_> {
    fn registration_type_id(&self) -> &str {
        match self.host.get_registration_type() {
            Some(registration_type) => &registration_type.id,
            None => self.host.get_registration_type_bundle().unwrap_or(""),
        }
    }

    fn is_new(&self) -> bool {
        self.registration.map_or(true, Registration::is_new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrantOption {
    pub value: RegistrantType,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhoField {
    pub title: &'static str,
    pub options: Vec<RegistrantOption>,
    pub default_value: Option<RegistrantType>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpacesField {
    pub visible: bool,
    pub max: i64,
    pub default_value: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateOption {
    pub value: RegistrationState,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateField {
    pub visible: bool,
    pub options: Vec<StateOption>,
    pub default_value: RegistrationState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormAction {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The register form as presented to an actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegisterForm {
    /// Reasons registration is unavailable. When present nothing else is shown.
    pub notices: Vec<String>,
    pub who_message: Option<String>,
    pub who_is_registering: Option<WhoField>,
    pub user_field_visible: bool,
    pub anon_mail_field_visible: bool,
    pub anon_mail_required: bool,
    pub spaces: Option<SpacesField>,
    pub state: Option<StateField>,
    pub show_created: bool,
    pub advanced: bool,
    pub actions: Vec<FormAction>,
}

/// Values submitted with the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FormSubmission {
    pub who_is_registering: Option<RegistrantType>,
    pub spaces: u32,
    pub anon_mail: Option<String>,
    pub user_uid: Option<i64>,
    pub state: Option<RegistrationState>,
}

/// A validation message, attached to a field when one is at fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    pub message: String,
}

impl FormError {
    fn form(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }
}

/// Registrant choices the actor may make for a registration type.
pub fn registrant_options(actor: &Account, registration_type: &str) -> Vec<RegistrantType> {
    let admin = is_registration_admin(actor, registration_type);
    let mut options = Vec::new();

    if actor.is_authenticated()
        && (admin || actor.has_permission(&permission::create_self(registration_type)))
    {
        options.push(RegistrantType::Me);
    }
    if admin || actor.has_permission(&permission::create_other_users(registration_type)) {
        options.push(RegistrantType::User);
    }
    if admin || actor.has_permission(&permission::create_other_anonymous(registration_type)) {
        options.push(RegistrantType::Anon);
    }

    options
}

/// How an existing registration relates to the actor.
pub fn registrant_type_of(registration: &Registration, actor: &Account) -> RegistrantType {
    match registration.registrant {
        Registrant::User { uid } if actor.is_authenticated() && uid == actor.uid => {
            RegistrantType::Me
        }
        Registrant::User { .. } => RegistrantType::User,
        Registrant::Anonymous { .. } => RegistrantType::Anon,
    }
}

fn spaces_field(ctx: &FormContext<'_>) -> SpacesField {
    let settings = ctx.host.get_settings();
    let capacity = i64::from(settings.capacity);
    let limit = i64::from(settings.maximum_spaces);
    let reserved = i64::try_from(ctx.host.get_active_spaces_reserved(ctx.registration))
        .unwrap_or(i64::MAX);
    let remaining = (capacity - reserved).max(0);

    let (max, description) = match (capacity > 0, limit > 0) {
        (true, true) => {
            let max = limit.min(remaining);
            (
                max,
                format!(
                    "The number of spaces you wish to reserve. {} spaces remaining. \
                     You may register up to {} spaces.",
                    remaining, max
                ),
            )
        }
        (true, false) => (
            remaining,
            format!(
                "The number of spaces you wish to reserve. {} spaces remaining.",
                remaining
            ),
        ),
        (false, true) => (
            limit,
            format!(
                "The number of spaces you wish to reserve. You may register up to {} spaces.",
                limit
            ),
        ),
        (false, false) => (
            UNBOUNDED_SPACES,
            "The number of spaces you wish to reserve.".to_string(),
        ),
    };

    SpacesField {
        visible: max > 1,
        max,
        default_value: ctx.registration.map_or(1, |r| r.count),
        description,
    }
}

fn state_field(ctx: &FormContext<'_>) -> StateField {
    let workflow = ctx.host.workflow();
    let current = ctx
        .registration
        .map(|r| r.state)
        .unwrap_or(workflow.default_registration_state);
    let options: Vec<StateOption> = workflow
        .states_to_show_on_form(Some(current), !ctx.is_new())
        .into_iter()
        .map(|definition| StateOption {
            value: definition.state,
            label: definition.label.clone(),
        })
        .collect();

    StateField {
        visible: !options.is_empty() && can_edit_state(ctx.actor, ctx.registration_type_id()),
        options,
        default_value: current,
    }
}

/// Builds the form for the register page or for editing a registration.
pub fn build_form(ctx: &FormContext<'_>) -> RegisterForm {
    let label = ctx.host.label();

    if ctx.is_new() {
        let eligibility = ctx.host.is_enabled_for_registration(1, None, ctx.clock);
        if !eligibility.allowed() {
            return RegisterForm {
                notices: eligibility.user_messages(label),
                ..Default::default()
            };
        }
    }

    let options = registrant_options(ctx.actor, ctx.registration_type_id());
    let default_value = match ctx.registration {
        Some(existing) if !existing.is_new() => Some(registrant_type_of(existing, ctx.actor)),
        _ if options.len() == 1 => options.first().copied(),
        _ => None,
    };

    let who_message = match options.as_slice() {
        [only] if ctx.actor.is_authenticated() => {
            let who = if *only == RegistrantType::Me {
                "Yourself"
            } else {
                only.label()
            };
            Some(format!("You are registering: {}", who))
        }
        _ => None,
    };

    let anon_allowed = options.contains(&RegistrantType::Anon);
    let admin_theme = ctx.actor.has_permission(VIEW_ADMIN_THEME);

    let mut actions = vec![FormAction {
        id: "submit",
        label: "Save Registration",
        url: None,
    }];
    if ctx.is_new() {
        actions.push(FormAction {
            id: "cancel",
            label: "Cancel",
            url: Some(host_url(&ctx.host.host_ref())),
        });
    }

    RegisterForm {
        notices: Vec::new(),
        who_message,
        user_field_visible: options.contains(&RegistrantType::User),
        anon_mail_field_visible: anon_allowed,
        anon_mail_required: options.len() == 1 && anon_allowed,
        who_is_registering: Some(WhoField {
            title: "This registration is for:",
            visible: options.len() > 1,
            options: options
                .iter()
                .map(|value| RegistrantOption {
                    value: *value,
                    label: value.label(),
                })
                .collect(),
            default_value,
        }),
        spaces: Some(spaces_field(ctx)),
        state: Some(state_field(ctx)),
        show_created: !ctx.is_new() && admin_theme,
        advanced: !ctx.is_new() && admin_theme,
        actions,
    }
}

/// The registrant type in effect for a submission.
///
/// Existing registrations keep their registrant. New ones take the submitted
/// choice, or the only available option.
fn effective_registrant_type(
    ctx: &FormContext<'_>,
    submission: &FormSubmission,
    options: &[RegistrantType],
) -> Result<RegistrantType, FormError> {
    if let Some(existing) = ctx.registration.filter(|r| !r.is_new()) {
        return Ok(registrant_type_of(existing, ctx.actor));
    }

    match (submission.who_is_registering, options) {
        (Some(chosen), _) if options.contains(&chosen) => Ok(chosen),
        (Some(_), _) => Err(FormError::field("who_is_registering", ILLEGAL_CHOICE)),
        (None, [only]) => Ok(*only),
        (None, _) => Err(FormError::field(
            "who_is_registering",
            "This registration is for: field is required.",
        )),
    }
}

/// Validates a submission. An empty result means the registration may be saved.
///
/// `selected_user` is the account loaded for `submission.user_uid`, or `None`
/// when it could not be found.
pub fn validate(
    ctx: &FormContext<'_>,
    submission: &FormSubmission,
    selected_user: Option<&UserRef>,
) -> Vec<FormError> {
    let mut errors = Vec::new();
    let settings = ctx.host.get_settings();
    let label = ctx.host.label();
    let spaces = submission.spaces;
    let is_new = ctx.is_new();

    if spaces < 1 {
        errors.push(FormError::field(
            "count",
            "Spaces must be higher than or equal to 1.",
        ));
    }
    if settings.maximum_spaces > 0 && spaces > settings.maximum_spaces {
        errors.push(FormError::field(
            "count",
            format!(
                "Spaces must be lower than or equal to {}.",
                settings.maximum_spaces
            ),
        ));
    }

    match ctx.registration.filter(|r| !r.is_new()) {
        None => {
            let eligibility = ctx.host.is_enabled_for_registration(spaces, None, ctx.clock);
            errors.extend(eligibility.user_messages(label).into_iter().map(FormError::form));
        }
        Some(existing) if ctx.host.workflow().is_active(existing.state) => {
            if !ctx.host.has_room(spaces, Some(existing)) {
                errors.push(FormError::form(denial_message(
                    label,
                    DenialReason::InsufficientSpaces,
                )));
            }
        }
        Some(_) => {}
    }

    let allow_multiple = settings.multiple_registrations;
    let options = registrant_options(ctx.actor, ctx.registration_type_id());
    match effective_registrant_type(ctx, submission, &options) {
        Err(error) => errors.push(error),
        Ok(RegistrantType::Anon) => {
            let existing_mail = ctx
                .registration
                .and_then(|r| r.registrant.anon_mail())
                .map(str::to_string);
            match submission
                .anon_mail
                .clone()
                .or(existing_mail)
                .filter(|mail| !mail.trim().is_empty())
            {
                Some(email) => {
                    if !allow_multiple && is_new && ctx.host.is_email_registered(&email) {
                        errors.push(FormError::field(
                            "anon_mail",
                            format!("{} is already registered for this event.", email),
                        ));
                    }
                }
                None => errors.push(FormError::field("anon_mail", "Email address is required.")),
            }
        }
        Ok(RegistrantType::Me) => {
            if ctx.actor.is_anonymous() {
                errors.push(FormError::field("who_is_registering", ILLEGAL_CHOICE));
            } else if !allow_multiple && is_new && ctx.host.is_user_registered(ctx.actor) {
                errors.push(FormError::form("You are already registered for this event."));
            }
        }
        Ok(RegistrantType::User) => {
            let uid = submission
                .user_uid
                .or_else(|| ctx.registration.and_then(|r| r.registrant.user_uid()));
            match (uid, selected_user) {
                (None, _) => errors.push(FormError::form("User name is required.")),
                (Some(_), Some(user)) => {
                    if !allow_multiple && is_new && ctx.host.is_uid_registered(user.uid) {
                        errors.push(FormError::field(
                            "user_uid",
                            format!("{} is already registered for this event.", user.name),
                        ));
                    }
                }
                (Some(_), None) if can_access_user_profiles(ctx.actor) => errors.push(
                    FormError::field("user_uid", "The selected user is no longer available."),
                ),
                (Some(_), None) => {
                    errors.push(FormError::field("user_uid", "Registration Failed."))
                }
            }
        }
    }

    if let Some(state) = submission.state {
        let field = state_field(ctx);
        if field.visible && !field.options.iter().any(|option| option.value == state) {
            errors.push(FormError::field("state", ILLEGAL_CHOICE));
        }
    }

    errors
}

/// Applies a validated submission, producing the registration to store.
pub fn prepare_registration(
    ctx: &FormContext<'_>,
    submission: &FormSubmission,
    now: DateTime<Utc>,
) -> Result<Registration, DomainError> {
    let workflow = ctx.host.workflow();
    let field = state_field(ctx);
    let chosen_state = submission.state.filter(|_| field.visible);

    if let Some(existing) = ctx.registration.filter(|r| !r.is_new()) {
        let mut registration = existing.clone();
        if submission.spaces < 1 {
            return Err(DomainError::InvalidSpaces);
        }
        registration.count = submission.spaces;
        if let (Registrant::Anonymous { email }, Some(new_mail)) =
            (&mut registration.registrant, submission.anon_mail.as_ref())
        {
            if !new_mail.trim().is_empty() {
                *email = new_mail.trim().to_string();
            }
        }
        match chosen_state {
            Some(state) if state != registration.state => {
                workflow.validate_state(state)?;
                registration.set_state(state, now);
            }
            _ => registration.changed_at = now,
        }
        return Ok(registration);
    }

    let options = registrant_options(ctx.actor, ctx.registration_type_id());
    let who = effective_registrant_type(ctx, submission, &options)
        .map_err(|_| DomainError::InvalidRegistrant)?;
    let registrant = match who {
        RegistrantType::Me if ctx.actor.is_authenticated() => Registrant::User { uid: ctx.actor.uid },
        RegistrantType::Me => return Err(DomainError::InvalidRegistrant),
        RegistrantType::User => Registrant::User {
            uid: submission.user_uid.ok_or(DomainError::InvalidRegistrant)?,
        },
        RegistrantType::Anon => Registrant::Anonymous {
            email: submission
                .anon_mail
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        },
    };

    let state = chosen_state.unwrap_or(workflow.default_registration_state);
    workflow.validate_state(state)?;

    let mut registration = Registration::new(
        ctx.registration_type_id(),
        ctx.host.host_ref(),
        submission.spaces,
        registrant,
        state,
        now,
    )?;
    registration.author_uid = Some(ctx.actor.uid).filter(|_| ctx.actor.is_authenticated());
    if let Some(langcode) = &ctx.host.record().langcode {
        registration.langcode = langcode.clone();
    }

    Ok(registration)
}

/// Where to send the actor after saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Redirect {
    External(String),
    Internal(String),
    Registration(i64),
    Host(HostRef),
}

impl Redirect {
    pub fn url(&self) -> String {
        match self {
            Redirect::External(url) | Redirect::Internal(url) => url.clone(),
            Redirect::Registration(id) => format!("/registration/{}", id),
            Redirect::Host(host) => host_url(host),
        }
    }
}

pub fn host_url(host: &HostRef) -> String {
    format!("/{}/{}", host.entity_type_id, host.entity_id)
}

/// Message and redirect after a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub message: String,
    pub redirect: Redirect,
}

pub fn save_outcome(host: &HostEntity, actor: &Account, registration: &Registration) -> SaveOutcome {
    let settings = host.get_settings();

    let message = settings
        .confirmation
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIRMATION.to_string());

    let redirect = match settings.confirmation_redirect.as_deref().filter(|r| !r.is_empty()) {
        Some(target) if is_external_url(target) => Redirect::External(escape_html(target)),
        Some(target) => {
            let mut path = escape_html(&strip_dangerous_protocols(target));
            if !path.starts_with(['/', '?', '#']) {
                path.insert(0, '/');
            }
            Redirect::Internal(path)
        }
        None => match registration.registration_id {
            Some(id) if can_view_registration(actor, registration) => Redirect::Registration(id),
            _ => Redirect::Host(host.host_ref()),
        },
    };

    SaveOutcome { message, redirect }
}

/// Log line for a saved registration.
pub fn registration_log_message(
    registrant_name: Option<&str>,
    email: Option<&str>,
    label: &str,
    registration_id: i64,
) -> String {
    let who = registrant_name.or(email).unwrap_or("");
    format!("{} registered for {} (ID #{})", who, label, registration_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        HostKind, HostRecord, RegistrationField, RegistrationSettings, RegistrationType,
    };
    use crate::services::clock::FixedClock;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    fn host_ref() -> HostRef {
        HostRef::new("node", 1)
    }

    fn settings(capacity: u32, maximum_spaces: u32) -> RegistrationSettings {
        let mut settings = RegistrationSettings::new(&host_ref(), "en");
        settings.settings_id = Some(1);
        settings.status = true;
        settings.capacity = capacity;
        settings.maximum_spaces = maximum_spaces;
        settings
    }

    fn host(settings: RegistrationSettings, registrations: Vec<Registration>) -> HostEntity {
        HostEntity::new(
            HostRecord::new(HostKind::Node, 1)
                .with_bundle("event")
                .with_label("RustConf")
                .with_registration_field(RegistrationField {
                    registration_type: Some("conference".to_string()),
                    default_settings: Default::default(),
                }),
            Some(RegistrationType::new("conference", "Conference")),
            Some(settings),
            registrations,
        )
    }

    fn saved(id: i64, count: u32, registrant: Registrant, state: RegistrationState) -> Registration {
        let mut registration =
            Registration::new("conference", host_ref(), count, registrant, state, now()).unwrap();
        registration.registration_id = Some(id);
        registration
    }

    fn actor(uid: i64, permissions: &[&str]) -> Account {
        Account::authenticated(uid, "ada", permissions.iter().copied())
    }

    fn context<'a>(
        host: &'a HostEntity,
        actor: &'a Account,
        registration: Option<&'a Registration>,
        clock: &'a FixedClock,
    ) -> FormContext<'a> {
        FormContext {
            host,
            actor,
            registration,
            clock,
        }
    }

    fn submission(who: RegistrantType, spaces: u32) -> FormSubmission {
        FormSubmission {
            who_is_registering: Some(who),
            spaces,
            ..Default::default()
        }
    }

    #[test]
    fn test_registrant_options() {
        let admin = actor(1, &["administer registration"]);
        assert_eq!(
            registrant_options(&admin, "conference"),
            vec![RegistrantType::Me, RegistrantType::User, RegistrantType::Anon]
        );

        let self_only = actor(2, &["create conference registration self"]);
        assert_eq!(registrant_options(&self_only, "conference"), vec![RegistrantType::Me]);

        let anonymous = Account::anonymous([
            "create conference registration self",
            "create conference registration other anonymous",
        ]);
        assert_eq!(registrant_options(&anonymous, "conference"), vec![RegistrantType::Anon]);
    }

    #[test]
    fn test_form_shows_notices_when_registration_closed() {
        let mut closed = settings(0, 1);
        closed.close = Some(now() - chrono::Duration::days(1));
        let host = host(closed, vec![]);
        let actor = actor(2, &["create conference registration self"]);
        let clock = FixedClock(now());

        let form = build_form(&context(&host, &actor, None, &clock));

        assert_eq!(
            form.notices,
            vec!["Sorry, unable to register for RustConf due to: registration has closed."]
        );
        assert!(form.who_is_registering.is_none());
        assert!(form.actions.is_empty());
    }

    #[test]
    fn test_form_single_option_message_and_hidden_selector() {
        let host = host(settings(0, 1), vec![]);
        let actor = actor(2, &["create conference registration self"]);
        let clock = FixedClock(now());

        let form = build_form(&context(&host, &actor, None, &clock));

        assert_eq!(form.who_message.as_deref(), Some("You are registering: Yourself"));
        let who = form.who_is_registering.unwrap();
        assert!(!who.visible);
        assert_eq!(who.default_value, Some(RegistrantType::Me));
        assert_eq!(form.actions.len(), 2);
        assert_eq!(form.actions[1].url.as_deref(), Some("/node/1"));
    }

    #[test]
    fn test_spaces_field_limits() {
        let clock = FixedClock(now());
        let actor = actor(1, &["administer registration"]);
        let taken = vec![saved(
            1,
            6,
            Registrant::Anonymous {
                email: "x@example.com".to_string(),
            },
            RegistrationState::Complete,
        )];

        let host_both = host(settings(10, 3), taken.clone());
        let spaces = build_form(&context(&host_both, &actor, None, &clock)).spaces.unwrap();
        assert_eq!(spaces.max, 3);
        assert!(spaces.visible);
        assert_eq!(
            spaces.description,
            "The number of spaces you wish to reserve. 4 spaces remaining. You may register up to 3 spaces."
        );

        let host_capacity = host(settings(10, 0), taken);
        let spaces = build_form(&context(&host_capacity, &actor, None, &clock)).spaces.unwrap();
        assert_eq!(spaces.max, 4);

        let host_limit = host(settings(0, 1), vec![]);
        let spaces = build_form(&context(&host_limit, &actor, None, &clock)).spaces.unwrap();
        assert_eq!(spaces.max, 1);
        assert!(!spaces.visible);

        let host_unbounded = host(settings(0, 0), vec![]);
        let spaces = build_form(&context(&host_unbounded, &actor, None, &clock)).spaces.unwrap();
        assert_eq!(spaces.max, UNBOUNDED_SPACES);
        assert_eq!(spaces.description, "The number of spaces you wish to reserve.");
    }

    #[test]
    fn test_spaces_field_never_negative_when_overbooked() {
        let clock = FixedClock(now());
        let actor = actor(1, &["administer registration"]);
        let editing = saved(2, 1, Registrant::User { uid: 1 }, RegistrationState::Complete);
        let registrations = vec![
            saved(
                1,
                7,
                Registrant::Anonymous {
                    email: "x@example.com".to_string(),
                },
                RegistrationState::Complete,
            ),
            editing.clone(),
        ];

        let capacity_only = host(settings(4, 0), registrations.clone());
        let spaces = build_form(&context(&capacity_only, &actor, Some(&editing), &clock))
            .spaces
            .unwrap();
        assert_eq!(spaces.max, 0);
        assert!(!spaces.visible);
        assert_eq!(
            spaces.description,
            "The number of spaces you wish to reserve. 0 spaces remaining."
        );

        let with_limit = host(settings(4, 3), registrations);
        let spaces = build_form(&context(&with_limit, &actor, Some(&editing), &clock))
            .spaces
            .unwrap();
        assert_eq!(spaces.max, 0);
    }

    #[test]
    fn test_state_field_requires_permission() {
        let host = host(settings(0, 1), vec![]);
        let clock = FixedClock(now());

        let editor = actor(1, &["administer registration", "edit conference registration state"]);
        let state = build_form(&context(&host, &editor, None, &clock)).state.unwrap();
        assert!(state.visible);
        assert_eq!(state.default_value, RegistrationState::Pending);
        assert_eq!(state.options.len(), 3);

        let admin = actor(1, &["administer registration"]);
        assert!(!build_form(&context(&host, &admin, None, &clock)).state.unwrap().visible);
    }

    #[test]
    fn test_duplicate_email_denied_for_new_registration() {
        let existing = saved(
            1,
            1,
            Registrant::Anonymous {
                email: "ada@example.com".to_string(),
            },
            RegistrationState::Complete,
        );
        let host = host(settings(0, 1), vec![existing.clone()]);
        let actor = Account::anonymous(["create conference registration other anonymous"]);
        let clock = FixedClock(now());

        let mut submission = submission(RegistrantType::Anon, 1);
        submission.anon_mail = Some("ada@example.com".to_string());

        let errors = validate(&context(&host, &actor, None, &clock), &submission, None);
        assert_eq!(
            errors,
            vec![FormError::field(
                "anon_mail",
                "ada@example.com is already registered for this event."
            )]
        );

        // Editing the existing registration skips the duplicate check.
        let admin = self::actor(1, &["administer registration"]);
        let errors = validate(&context(&host, &admin, Some(&existing), &clock), &submission, None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_multiple_registrations_allow_duplicates() {
        let mut allow = settings(0, 1);
        allow.multiple_registrations = true;
        let host = host(allow, vec![saved(1, 1, Registrant::User { uid: 2 }, RegistrationState::Pending)]);
        let actor = actor(2, &["create conference registration self"]);
        let clock = FixedClock(now());

        let errors = validate(
            &context(&host, &actor, None, &clock),
            &submission(RegistrantType::Me, 1),
            None,
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_self_duplicate_denied() {
        let host = host(
            settings(0, 1),
            vec![saved(1, 1, Registrant::User { uid: 2 }, RegistrationState::Pending)],
        );
        let actor = actor(2, &["create conference registration self"]);
        let clock = FixedClock(now());

        let errors = validate(
            &context(&host, &actor, None, &clock),
            &FormSubmission {
                spaces: 1,
                ..Default::default()
            },
            None,
        );
        assert_eq!(
            errors,
            vec![FormError::form("You are already registered for this event.")]
        );
    }

    #[test]
    fn test_missing_user_messages_depend_on_profile_access() {
        let host = host(settings(0, 1), vec![]);
        let clock = FixedClock(now());
        let mut submission = submission(RegistrantType::User, 1);
        submission.user_uid = Some(404);

        let with_profiles = actor(1, &["administer registration", "access user profiles"]);
        let errors = validate(&context(&host, &with_profiles, None, &clock), &submission, None);
        assert_eq!(
            errors,
            vec![FormError::field("user_uid", "The selected user is no longer available.")]
        );

        let without_profiles = actor(1, &["administer registration"]);
        let errors = validate(&context(&host, &without_profiles, None, &clock), &submission, None);
        assert_eq!(errors, vec![FormError::field("user_uid", "Registration Failed.")]);
    }

    #[test]
    fn test_existing_active_registration_rechecks_room_excluding_itself() {
        let own = saved(1, 3, Registrant::User { uid: 2 }, RegistrationState::Complete);
        let host = host(settings(5, 0), vec![own.clone()]);
        let actor = actor(1, &["administer registration"]);
        let clock = FixedClock(now());
        let registrant = UserRef {
            uid: 2,
            name: "grace".to_string(),
            mail: None,
        };

        assert!(validate(
            &context(&host, &actor, Some(&own), &clock),
            &FormSubmission {
                spaces: 5,
                ..Default::default()
            },
            Some(&registrant)
        )
        .is_empty());

        let errors = validate(
            &context(&host, &actor, Some(&own), &clock),
            &FormSubmission {
                spaces: 6,
                ..Default::default()
            },
            Some(&registrant),
        );
        assert_eq!(
            errors,
            vec![FormError::form(
                "Sorry, unable to register for RustConf due to: insufficient spaces remaining."
            )]
        );
    }

    #[test]
    fn test_spaces_above_limit_rejected() {
        let host = host(settings(0, 2), vec![]);
        let actor = actor(2, &["create conference registration self"]);
        let clock = FixedClock(now());

        let errors = validate(
            &context(&host, &actor, None, &clock),
            &submission(RegistrantType::Me, 3),
            None,
        );
        assert_eq!(
            errors,
            vec![FormError::field("count", "Spaces must be lower than or equal to 2.")]
        );
    }

    #[test]
    fn test_prepare_self_registration() {
        let host = host(settings(0, 1), vec![]);
        let actor = actor(2, &["create conference registration self"]);
        let clock = FixedClock(now());

        let registration = prepare_registration(
            &context(&host, &actor, None, &clock),
            &submission(RegistrantType::Me, 1),
            now(),
        )
        .unwrap();

        assert_eq!(registration.registrant, Registrant::User { uid: 2 });
        assert_eq!(registration.author_uid, Some(2));
        assert_eq!(registration.state, RegistrationState::Pending);
        assert_eq!(registration.registration_type, "conference");
        assert!(registration.is_new());
    }

    #[test]
    fn test_prepare_ignores_state_without_permission() {
        let host = host(settings(0, 1), vec![]);
        let actor = actor(2, &["create conference registration self"]);
        let clock = FixedClock(now());
        let mut submission = submission(RegistrantType::Me, 1);
        submission.state = Some(RegistrationState::Complete);

        let registration =
            prepare_registration(&context(&host, &actor, None, &clock), &submission, now()).unwrap();
        assert_eq!(registration.state, RegistrationState::Pending);
    }

    #[test]
    fn test_save_outcome_redirects() {
        let mut configured = settings(0, 1);
        configured.confirmation_redirect = Some("https://example.com/thanks".to_string());
        let registration = saved(9, 1, Registrant::User { uid: 2 }, RegistrationState::Pending);
        let viewer = actor(2, &["view own conference registration"]);

        let outcome = save_outcome(&host(configured.clone(), vec![]), &viewer, &registration);
        assert_eq!(outcome.message, DEFAULT_CONFIRMATION);
        assert_eq!(
            outcome.redirect,
            Redirect::External("https://example.com/thanks".to_string())
        );

        configured.confirmation_redirect = Some("javascript:thanks".to_string());
        configured.confirmation = Some("See you there!".to_string());
        let outcome = save_outcome(&host(configured.clone(), vec![]), &viewer, &registration);
        assert_eq!(outcome.message, "See you there!");
        assert_eq!(outcome.redirect, Redirect::Internal("/thanks".to_string()));

        configured.confirmation_redirect = None;
        let outcome = save_outcome(&host(configured.clone(), vec![]), &viewer, &registration);
        assert_eq!(outcome.redirect.url(), "/registration/9");

        let stranger = actor(3, &[]);
        let outcome = save_outcome(&host(configured, vec![]), &stranger, &registration);
        assert_eq!(outcome.redirect.url(), "/node/1");
    }

    #[test]
    fn test_registration_log_message() {
        assert_eq!(
            registration_log_message(Some("ada"), None, "RustConf", 12),
            "ada registered for RustConf (ID #12)"
        );
        assert_eq!(
            registration_log_message(None, Some("a@example.com"), "RustConf", 13),
            "a@example.com registered for RustConf (ID #13)"
        );
    }
}
