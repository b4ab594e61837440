//! Menu screens: profile and change password.

use reqwest::multipart::Form;
use tracing::info;

use tastybites_shared::{media, ApiMessage, Gender, UserInfo};

use crate::api::PasswordChangeRequest;
use crate::commands::Services;
use crate::error::{ClientError, Result};
use crate::events::Alert;
use crate::upload::Attachment;

/// Editable copy of the viewer's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub user_name: String,
    pub gender: String,
    /// Server storage path of the current picture. Display only; see
    /// [`media::avatar_url`].
    pub current_picture: Option<String>,
    /// A file picked to replace the picture.
    pub new_picture: Option<Attachment>,
}

impl ProfileForm {
    pub fn from_info(info: &UserInfo) -> Self {
        Self {
            full_name: info.full_name.clone().unwrap_or_default(),
            user_name: info.user_name.clone().unwrap_or_default(),
            gender: info.gender.clone().unwrap_or_default(),
            current_picture: info.profile_path.clone().filter(|p| !p.trim().is_empty()),
            new_picture: None,
        }
    }

    pub fn picture_url(&self, api_base: &str) -> Option<String> {
        media::avatar_url(api_base, self.current_picture.as_deref())
    }

    /// Only filled-in fields are sent. An unknown gender is left out, and
    /// the picture is uploaded only when a new one was picked.
    async fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        if !self.full_name.trim().is_empty() {
            form = form.text("fullName", self.full_name.trim().to_string());
        }
        if !self.user_name.trim().is_empty() {
            form = form.text("userName", self.user_name.trim().to_string());
        }
        if let Some(gender) = Gender::parse(&self.gender) {
            form = form.text("gender", gender.as_str());
        }
        if let Some(picture) = self.new_picture {
            form = form.part("profilePath", picture.into_part().await?);
        }
        Ok(form)
    }
}

/// `success: false` in a 2xx body is still a failure.
fn require_success(resp: ApiMessage, fallback: &str) -> Result<String> {
    match resp.success {
        Some(true) => Ok(resp.message.unwrap_or_default()),
        _ => Err(ClientError::validation(
            resp.message.unwrap_or_else(|| fallback.to_string()),
        )),
    }
}

pub struct ProfileEditor {
    svc: Services,
}

impl ProfileEditor {
    pub fn new(svc: Services) -> Self {
        Self { svc }
    }

    pub async fn fetch(&self) -> Result<ProfileForm> {
        let token = self.svc.token()?;
        let resp = self.svc.api.profile(&token).await.map_err(|e| {
            self.svc.events.report(&e, "Failed to fetch profile");
            e
        })?;
        Ok(resp
            .user
            .user_info
            .as_ref()
            .map(ProfileForm::from_info)
            .unwrap_or_default())
    }

    pub async fn save(&self, form: ProfileForm) -> Result<String> {
        let token = self.svc.token()?;
        let result = async {
            let multipart = form.into_form().await?;
            let resp = self.svc.api.edit_profile(&token, multipart).await?;
            require_success(resp, "Failed to update profile")
        }
        .await;

        match result {
            Ok(message) => {
                info!("profile updated");
                self.svc.events.alert(Alert::success(message.clone()));
                Ok(message)
            }
            Err(e) => {
                self.svc.events.report(&e, "Failed to update profile");
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    pub fn validate(&self) -> Result<()> {
        if self.current_password.is_empty()
            || self.new_password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(ClientError::validation("Please fill in all fields."));
        }
        if self.new_password != self.confirm_password {
            return Err(ClientError::validation(
                "New password and confirmation do not match.",
            ));
        }
        Ok(())
    }
}

pub struct PasswordChanger {
    svc: Services,
}

impl PasswordChanger {
    pub fn new(svc: Services) -> Self {
        Self { svc }
    }

    /// Validate locally, then submit. The form is cleared on success.
    pub async fn submit(&self, form: &mut PasswordForm) -> Result<String> {
        if let Err(e) = form.validate() {
            self.svc.events.report(&e, "Please fill in all fields.");
            return Err(e);
        }
        let token = self.svc.token()?;

        let request = PasswordChangeRequest {
            current_password: form.current_password.clone(),
            new_password: form.new_password.clone(),
            new_password_confirmation: form.confirm_password.clone(),
        };
        let result = match self.svc.api.change_password(&token, &request).await {
            Ok(resp) => require_success(resp, "Something went wrong."),
            Err(e) => Err(e),
        };

        match result {
            Ok(message) => {
                info!("password changed");
                *form = PasswordForm::default();
                self.svc.events.alert(Alert::success(message.clone()));
                Ok(message)
            }
            Err(e) => {
                self.svc
                    .events
                    .report(&e, "Something went wrong. Try again later.");
                Err(e)
            }
        }
    }
}
