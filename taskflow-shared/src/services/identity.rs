/// Identity & onboarding engine
///
/// Drives a user record through its authentication lifecycle:
///
/// ```text
/// invited ──issue OTP──▶ otp_pending ──verify──▶ invited (OTP consumed)
///    │                                              │
///    └──────────────── setup password ◀─────────────┘
///                           │
///                           ▼
///                     password_set ⇄ reset_pending
/// ```
///
/// Every state change is persisted immediately. OTPs and reset tokens are
/// stored only as SHA-256 digests; the plaintext leaves the process once, in
/// the email body. When that email cannot be sent the transient fields are
/// cleared again before the failure is reported.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{
    jwt::{self, Claims},
    password, token,
};
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{normalize_email, Address, NewUser, Role, User, UserProfile, UserSummary};
use crate::notify::{templates, Mailer};
use crate::store::UserStore;

/// Lifetime of a password-reset token
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

/// Placeholder profile for admin invites
const ADMIN_FIRST_NAME: &str = "Admin";
const ADMIN_LAST_NAME: &str = "User";
const ADMIN_MOBILE: &str = "+1234567890";

/// Token and lifetime settings
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,

    /// Session token lifetime
    pub session_ttl: Duration,

    /// OTP validity window
    pub otp_ttl: Duration,
}

impl IdentitySettings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            session_ttl: Duration::days(1),
            otp_ttl: Duration::minutes(10),
        }
    }
}

/// Profile supplied by an admin when inviting a regular user
#[derive(Debug, Clone)]
pub struct UserInvite {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub address: Option<Address>,
}

/// Result of an invite
///
/// The invite stands even when the OTP email fails; `otp_sent` reports which
/// case occurred.
#[derive(Debug, Clone)]
pub struct InviteOutcome {
    pub user: User,
    pub otp_sent: bool,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    settings: IdentitySettings,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        settings: IdentitySettings,
    ) -> Self {
        Self {
            users,
            mailer,
            settings,
        }
    }

    pub fn settings(&self) -> &IdentitySettings {
        &self.settings
    }

    /// Invites an administrator by email alone
    pub async fn invite_admin(&self, email: &str) -> ServiceResult<InviteOutcome> {
        self.invite(NewUser::invited(
            ADMIN_FIRST_NAME.to_string(),
            ADMIN_LAST_NAME.to_string(),
            normalize_email(email),
            ADMIN_MOBILE.to_string(),
            None,
            Role::Admin,
        ))
        .await
    }

    /// Invites a regular user with a full profile
    pub async fn invite_user(&self, invite: UserInvite) -> ServiceResult<InviteOutcome> {
        self.invite(NewUser::invited(
            invite.first_name.trim().to_string(),
            invite.last_name.trim().to_string(),
            normalize_email(&invite.email),
            invite.mobile_number.trim().to_string(),
            invite.address,
            Role::User,
        ))
        .await
    }

    async fn invite(&self, new_user: NewUser) -> ServiceResult<InviteOutcome> {
        if new_user.email.is_empty() {
            return Err(ServiceError::BadRequest("Please provide an email".to_string()));
        }
        new_user.validate().map_err(ServiceError::BadRequest)?;

        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }

        let mut user = self.users.insert(new_user).await?;
        info!(user_id = %user.id, role = %user.role, "User invited");

        let otp_sent = match self.issue_otp(&mut user).await {
            Ok(_) => true,
            Err(ServiceError::NotificationFailure(e)) => {
                warn!(user_id = %user.id, error = %e, "Invite stored but OTP email failed");
                false
            }
            Err(e) => return Err(e),
        };

        Ok(InviteOutcome { user, otp_sent })
    }

    /// Generates, stores, and emails a fresh OTP, returning the plaintext
    ///
    /// Overwrites any previous OTP. On delivery failure the OTP fields are
    /// cleared and `NotificationFailure` is returned.
    pub async fn issue_otp(&self, user: &mut User) -> ServiceResult<String> {
        let otp = token::generate_otp();
        user.set_otp(token::digest(&otp), Utc::now() + self.settings.otp_ttl);
        self.users.save(user).await?;

        let message = templates::otp_email(
            &user.email,
            &user.first_name,
            &otp,
            self.settings.otp_ttl.num_minutes(),
        );

        if let Err(e) = self.mailer.send(message).await {
            user.clear_otp();
            if let Err(store_err) = self.users.save(user).await {
                error!(user_id = %user.id, error = %store_err, "Could not clear OTP");
                return Err(store_err.into());
            }
            return Err(ServiceError::NotificationFailure(e));
        }

        debug!(user_id = %user.id, "OTP issued");
        Ok(otp)
    }

    /// Re-sends an OTP to a user who has not finished first login
    pub async fn resend_otp(&self, email: &str) -> ServiceResult<()> {
        let mut user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        if !user.is_first_login {
            return Err(ServiceError::AlreadySet);
        }

        self.issue_otp(&mut user).await?;
        Ok(())
    }

    /// Consumes a matching, unexpired OTP and returns the user's id
    pub async fn verify_otp(&self, email: &str, otp: &str) -> ServiceResult<Uuid> {
        let mut user = self
            .users
            .find_by_otp(&normalize_email(email), &token::digest(otp.trim()), Utc::now())
            .await?
            .ok_or(ServiceError::InvalidOrExpiredOtp)?;

        user.clear_otp();
        self.users.save(&user).await?;

        info!(user_id = %user.id, "OTP verified");
        Ok(user.id)
    }

    /// Sets the first password and opens a session
    pub async fn setup_password(&self, user_id: Uuid, new_password: &str) -> ServiceResult<String> {
        password::validate_password(new_password).map_err(ServiceError::BadRequest)?;

        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        if !user.is_first_login {
            return Err(ServiceError::AlreadySet);
        }

        user.set_password_hash(password::hash_password(new_password)?);
        self.users.save(&user).await?;

        info!(user_id = %user.id, "Initial password set");
        self.session_for(&user)
    }

    /// Authenticates by email and password
    ///
    /// Blank values count as missing.
    pub async fn login(
        &self,
        email: Option<&str>,
        secret: Option<&str>,
    ) -> ServiceResult<LoginOutcome> {
        let (email, secret) = match (
            email.map(str::trim).filter(|e| !e.is_empty()),
            secret.filter(|p| !p.is_empty()),
        ) {
            (Some(e), Some(p)) => (e, p),
            _ => {
                return Err(ServiceError::BadRequest(
                    "Please provide an email and password".to_string(),
                ))
            }
        };

        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !user.is_active {
            return Err(ServiceError::AccountDisabled);
        }

        let hash = match (&user.password_hash, user.is_first_login) {
            (Some(hash), false) => hash,
            _ => return Err(ServiceError::PasswordNotSet),
        };

        if !password::verify_password(secret, hash)? {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            token: self.session_for(&user)?,
            user: UserSummary::from(&user),
        })
    }

    /// Profile of the authenticated user
    pub async fn me(&self, user_id: Uuid) -> ServiceResult<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| UserProfile::from(&u))
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Issues a reset token and emails `<base_url>/reset-password/<token>`
    pub async fn forgot_password(&self, email: &str, base_url: &str) -> ServiceResult<()> {
        let mut user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| ServiceError::NotFound("There is no user with that email".to_string()))?;

        let reset_token = token::generate_reset_token();
        user.set_reset_token(
            token::digest(&reset_token),
            Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        );
        self.users.save(&user).await?;

        let url = format!(
            "{}/reset-password/{}",
            base_url.trim_end_matches('/'),
            reset_token
        );

        if let Err(e) = self.mailer.send(templates::reset_email(&user.email, &url)).await {
            user.clear_reset_token();
            if let Err(store_err) = self.users.save(&user).await {
                error!(user_id = %user.id, error = %store_err, "Could not clear reset token");
                return Err(store_err.into());
            }
            return Err(ServiceError::NotificationFailure(e));
        }

        info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// Consumes a reset token, sets the new password, and opens a session
    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> ServiceResult<String> {
        password::validate_password(new_password).map_err(ServiceError::BadRequest)?;

        let mut user = self
            .users
            .find_by_reset_token(&token::digest(reset_token), Utc::now())
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        user.set_password_hash(password::hash_password(new_password)?);
        user.clear_reset_token();
        self.users.save(&user).await?;

        info!(user_id = %user.id, "Password reset");
        self.session_for(&user)
    }

    /// Replaces the password of an authenticated user
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        password::validate_password(new_password).map_err(ServiceError::BadRequest)?;

        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(ServiceError::PasswordNotSet)?;

        if !password::verify_password(current_password, hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        user.set_password_hash(password::hash_password(new_password)?);
        self.users.save(&user).await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    fn session_for(&self, user: &User) -> ServiceResult<String> {
        let claims = Claims::new(user.id, user.role, self.settings.session_ttl);
        Ok(jwt::create_token(&claims, &self.settings.jwt_secret)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_token;
    use crate::notify::MemoryMailer;
    use crate::store::MemoryStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    struct Harness {
        identity: IdentityService,
        store: Arc<MemoryStore>,
        mailer: Arc<MemoryMailer>,
    }

    fn harness_with(settings: IdentitySettings) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(MemoryMailer::new());
        let identity = IdentityService::new(store.clone(), mailer.clone(), settings);
        Harness {
            identity,
            store,
            mailer,
        }
    }

    fn harness() -> Harness {
        harness_with(IdentitySettings::new(SECRET))
    }

    fn invite(email: &str) -> UserInvite {
        UserInvite {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            mobile_number: "+15550001111".to_string(),
            address: None,
        }
    }

    impl Harness {
        fn otp_for(&self, email: &str) -> String {
            let message = self.mailer.last_to(email).unwrap();
            templates::extract_otp(&message.html).unwrap()
        }

        fn reset_token_for(&self, email: &str) -> String {
            let message = self.mailer.last_to(email).unwrap();
            templates::extract_reset_token(&message.html).unwrap()
        }

        async fn stored(&self, id: Uuid) -> User {
            UserStore::find_by_id(self.store.as_ref(), id)
                .await
                .unwrap()
                .unwrap()
        }

        async fn onboard(&self, email: &str, secret: &str) -> Uuid {
            self.identity.invite_user(invite(email)).await.unwrap();
            let otp = self.otp_for(email);
            let id = self.identity.verify_otp(email, &otp).await.unwrap();
            self.identity.setup_password(id, secret).await.unwrap();
            id
        }
    }

    #[tokio::test]
    async fn test_invite_creates_first_login_user_and_sends_one_otp() {
        let h = harness();
        let outcome = h.identity.invite_user(invite("a@x.com")).await.unwrap();

        assert!(outcome.otp_sent);
        assert!(outcome.user.is_first_login);
        assert!(outcome.user.password_hash.is_none());
        assert_eq!(outcome.user.role, Role::User);
        assert_eq!(h.mailer.sent().len(), 1);

        let otp = h.otp_for("a@x.com");
        assert_eq!(otp.len(), 6);

        let stored = h.stored(outcome.user.id).await;
        assert_eq!(stored.otp.as_deref(), Some(token::digest(&otp).as_str()));
    }

    #[tokio::test]
    async fn test_invite_admin_uses_placeholders() {
        let h = harness();
        let outcome = h.identity.invite_admin(" Boss@X.com ").await.unwrap();

        assert_eq!(outcome.user.role, Role::Admin);
        assert_eq!(outcome.user.email, "boss@x.com");
        assert_eq!(outcome.user.first_name, "Admin");
        assert_eq!(outcome.user.mobile_number, "+1234567890");
    }

    #[tokio::test]
    async fn test_invite_existing_email_conflicts_for_both_variants() {
        let h = harness();
        h.identity.invite_user(invite("a@x.com")).await.unwrap();

        assert!(matches!(
            h.identity.invite_user(invite("a@x.com")).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            h.identity.invite_admin("A@x.com").await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_invite_survives_mail_failure_and_clears_otp() {
        let h = harness();
        h.mailer.set_failing(true);

        let outcome = h.identity.invite_user(invite("a@x.com")).await.unwrap();
        assert!(!outcome.otp_sent);

        let stored = h.stored(outcome.user.id).await;
        assert!(stored.otp.is_none());
        assert!(stored.otp_expire.is_none());
    }

    #[tokio::test]
    async fn test_issue_otp_reports_notification_failure() {
        let h = harness();
        let mut user = h.identity.invite_user(invite("a@x.com")).await.unwrap().user;

        h.mailer.set_failing(true);
        let result = h.identity.issue_otp(&mut user).await;
        assert!(matches!(result, Err(ServiceError::NotificationFailure(_))));
        assert!(h.stored(user.id).await.otp.is_none());
    }

    #[tokio::test]
    async fn test_verify_otp_is_single_use() {
        let h = harness();
        let user = h.identity.invite_user(invite("a@x.com")).await.unwrap().user;
        let otp = h.otp_for("a@x.com");

        let id = h.identity.verify_otp("a@x.com", &otp).await.unwrap();
        assert_eq!(id, user.id);
        assert!(h.stored(id).await.otp.is_none());

        assert!(matches!(
            h.identity.verify_otp("a@x.com", &otp).await,
            Err(ServiceError::InvalidOrExpiredOtp)
        ));
    }

    #[tokio::test]
    async fn test_verify_otp_failures_are_indistinguishable() {
        let h = harness();
        h.identity.invite_user(invite("a@x.com")).await.unwrap();
        let otp = h.otp_for("a@x.com");
        let wrong = if otp == "123456" { "654321" } else { "123456" };

        for (email, code) in [("a@x.com", wrong), ("nobody@x.com", otp.as_str())] {
            let err = h.identity.verify_otp(email, code).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidOrExpiredOtp));
        }
    }

    #[tokio::test]
    async fn test_verify_otp_rejects_expired_code() {
        let mut settings = IdentitySettings::new(SECRET);
        settings.otp_ttl = Duration::seconds(-1);
        let h = harness_with(settings);

        h.identity.invite_user(invite("a@x.com")).await.unwrap();
        let otp = h.otp_for("a@x.com");

        assert!(matches!(
            h.identity.verify_otp("a@x.com", &otp).await,
            Err(ServiceError::InvalidOrExpiredOtp)
        ));
    }

    #[tokio::test]
    async fn test_resend_otp_replaces_previous_code() {
        let h = harness();
        let user = h.identity.invite_user(invite("a@x.com")).await.unwrap().user;

        h.identity.resend_otp("a@x.com").await.unwrap();
        assert_eq!(h.mailer.sent().len(), 2);

        let latest = token::digest(&h.otp_for("a@x.com"));
        assert_eq!(h.stored(user.id).await.otp.as_deref(), Some(latest.as_str()));
    }

    #[tokio::test]
    async fn test_resend_otp_after_setup_is_already_set() {
        let h = harness();
        h.onboard("a@x.com", "secret1").await;
        assert!(matches!(
            h.identity.resend_otp("a@x.com").await,
            Err(ServiceError::AlreadySet)
        ));
        assert!(matches!(
            h.identity.resend_otp("ghost@x.com").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_setup_password_issues_token_and_rejects_replay() {
        let h = harness();
        let user = h.identity.invite_user(invite("a@x.com")).await.unwrap().user;

        let session = h.identity.setup_password(user.id, "secret1").await.unwrap();
        let claims = validate_token(&session, SECRET).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::User);

        let stored = h.stored(user.id).await;
        assert!(!stored.is_first_login);
        assert!(stored.password_hash.is_some());

        assert!(matches!(
            h.identity.setup_password(user.id, "another1").await,
            Err(ServiceError::AlreadySet)
        ));
    }

    #[tokio::test]
    async fn test_setup_password_unknown_user_and_short_password() {
        let h = harness();
        assert!(matches!(
            h.identity.setup_password(Uuid::new_v4(), "secret1").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            h.identity.setup_password(Uuid::new_v4(), "abc").await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_login_error_cases() {
        let h = harness();
        h.identity.invite_user(invite("pending@x.com")).await.unwrap();
        let id = h.onboard("a@x.com", "secret1").await;

        assert!(matches!(
            h.identity.login(Some("a@x.com"), None).await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            h.identity.login(Some(""), Some("secret1")).await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            h.identity.login(Some("pending@x.com"), Some("secret1")).await,
            Err(ServiceError::PasswordNotSet)
        ));

        let unknown = h.identity.login(Some("ghost@x.com"), Some("secret1")).await.unwrap_err();
        let wrong = h.identity.login(Some("a@x.com"), Some("wrong-pass")).await.unwrap_err();
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
        assert!(matches!(wrong, ServiceError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());

        let mut user = h.stored(id).await;
        user.is_active = false;
        UserStore::save(h.store.as_ref(), &user).await.unwrap();
        assert!(matches!(
            h.identity.login(Some("a@x.com"), Some("secret1")).await,
            Err(ServiceError::AccountDisabled)
        ));
    }

    #[tokio::test]
    async fn test_end_to_end_onboarding() {
        let h = harness();
        h.identity.invite_user(invite("a@x.com")).await.unwrap();
        let otp = h.otp_for("a@x.com");

        let user_id = h.identity.verify_otp("a@x.com", &otp).await.unwrap();
        let setup_token = h.identity.setup_password(user_id, "secret1").await.unwrap();
        assert!(!setup_token.is_empty());

        let outcome = h.identity.login(Some("A@X.com"), Some("secret1")).await.unwrap();
        assert_eq!(outcome.user.id, user_id);
        assert_eq!(outcome.user.role, Role::User);
        assert_eq!(validate_token(&outcome.token, SECRET).unwrap().sub, user_id);
    }

    #[tokio::test]
    async fn test_forgot_and_reset_password_single_use() {
        let h = harness();
        h.onboard("a@x.com", "secret1").await;

        h.identity
            .forgot_password("a@x.com", "http://localhost:5000/")
            .await
            .unwrap();
        let message = h.mailer.last_to("a@x.com").unwrap();
        assert!(message.html.contains("http://localhost:5000/reset-password/"));
        let reset = h.reset_token_for("a@x.com");
        assert_eq!(reset.len(), 40);

        h.identity.reset_password(&reset, "newsecret").await.unwrap();
        assert!(h.identity.login(Some("a@x.com"), Some("newsecret")).await.is_ok());

        assert!(matches!(
            h.identity.reset_password(&reset, "another1").await,
            Err(ServiceError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_reset_completes_first_login() {
        let h = harness();
        let user = h.identity.invite_user(invite("a@x.com")).await.unwrap().user;

        h.identity.forgot_password("a@x.com", "http://app").await.unwrap();
        let reset = h.reset_token_for("a@x.com");
        h.identity.reset_password(&reset, "secret1").await.unwrap();

        let stored = h.stored(user.id).await;
        assert!(!stored.is_first_login);
        assert!(stored.reset_password_token.is_none());
    }

    #[tokio::test]
    async fn test_reset_rejects_expired_token() {
        let h = harness();
        let id = h.onboard("a@x.com", "secret1").await;

        h.identity.forgot_password("a@x.com", "http://app").await.unwrap();
        let reset = h.reset_token_for("a@x.com");

        let mut user = h.stored(id).await;
        user.reset_password_expire = Some(Utc::now() - Duration::minutes(1));
        UserStore::save(h.store.as_ref(), &user).await.unwrap();

        assert!(matches!(
            h.identity.reset_password(&reset, "newsecret").await,
            Err(ServiceError::InvalidToken)
        ));
        assert!(h.identity.login(Some("a@x.com"), Some("secret1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_forgot_password_failures() {
        let h = harness();
        assert!(matches!(
            h.identity.forgot_password("ghost@x.com", "http://app").await,
            Err(ServiceError::NotFound(_))
        ));

        let id = h.onboard("a@x.com", "secret1").await;
        h.mailer.set_failing(true);
        assert!(matches!(
            h.identity.forgot_password("a@x.com", "http://app").await,
            Err(ServiceError::NotificationFailure(_))
        ));

        let stored = h.stored(id).await;
        assert!(stored.reset_password_token.is_none());
        assert!(stored.reset_password_expire.is_none());
    }

    #[tokio::test]
    async fn test_change_password() {
        let h = harness();
        let id = h.onboard("a@x.com", "secret1").await;

        assert!(matches!(
            h.identity.change_password(id, "wrong-one", "secret2").await,
            Err(ServiceError::InvalidCredentials)
        ));

        h.identity.change_password(id, "secret1", "secret2").await.unwrap();
        assert!(h.identity.login(Some("a@x.com"), Some("secret2")).await.is_ok());

        let pending = h.identity.invite_user(invite("b@x.com")).await.unwrap().user;
        assert!(matches!(
            h.identity.change_password(pending.id, "anything", "secret2").await,
            Err(ServiceError::PasswordNotSet)
        ));
    }

    #[tokio::test]
    async fn test_me_returns_profile() {
        let h = harness();
        let id = h.onboard("a@x.com", "secret1").await;

        let profile = h.identity.me(id).await.unwrap();
        assert_eq!(profile.email, "a@x.com");
        assert!(!profile.is_first_login);

        assert!(matches!(
            h.identity.me(Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
