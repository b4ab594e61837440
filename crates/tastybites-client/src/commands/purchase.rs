//! Buying a premium recipe with a proof of payment.

use std::sync::Arc;

use reqwest::multipart::Form;

use tastybites_shared::constants::PROOF_FILE_NAME;
use tastybites_shared::{PurchaseStatus, Recipe, RecipeId};

use crate::backend::ReactionApi;
use crate::commands::Services;
use crate::error::{ClientError, Result};
use crate::events::Alert;
use crate::overlay::ReactionOverlay;
use crate::upload::Attachment;

const INCOMPLETE: &str = "Please fill in all fields and upload proof.";

#[derive(Debug, Clone)]
pub struct BuyForm {
    pub recipe: Recipe,
    pub phone_number: String,
    /// Prefilled with the recipe price.
    pub amount: String,
    pub reference: String,
    pub proof: Option<Attachment>,
}

impl BuyForm {
    pub fn new(recipe: Recipe) -> Self {
        let amount = recipe.price.map(format_amount).unwrap_or_default();
        Self {
            recipe,
            phone_number: String::new(),
            amount,
            reference: String::new(),
            proof: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let blank = [&self.phone_number, &self.amount, &self.reference]
            .iter()
            .any(|v| v.trim().is_empty());
        if blank || self.proof.is_none() {
            return Err(ClientError::validation(INCOMPLETE));
        }
        Ok(())
    }

    async fn into_form(self) -> Result<Form> {
        let proof = self
            .proof
            .ok_or_else(|| ClientError::validation(INCOMPLETE))?;
        let mut proof = proof.renamed(PROOF_FILE_NAME);
        proof.mime_type = "image/jpeg".to_string();

        Ok(Form::new()
            .text("recipeID", self.recipe.id.to_string())
            .text("phone_number", self.phone_number.trim().to_string())
            .text("amount", self.amount.trim().to_string())
            .text("reference", self.reference.trim().to_string())
            .part("proof", proof.into_part().await?))
    }
}

/// `150.0` shows as `150`, `99.5` as `99.5`.
fn format_amount(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{price:.0}")
    } else {
        price.to_string()
    }
}

/// What the buy endpoint accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub recipe_id: RecipeId,
    pub status: PurchaseStatus,
    pub message: String,
}

pub struct Checkout<A: ReactionApi> {
    svc: Services,
    overlay: Arc<ReactionOverlay<A>>,
}

impl<A: ReactionApi> Checkout<A> {
    pub fn new(svc: Services, overlay: Arc<ReactionOverlay<A>>) -> Self {
        Self { svc, overlay }
    }

    /// Submit the form. On success the purchase status is recorded in the
    /// overlay only; a list showing the recipe picks it up through
    /// [`RecipeBrowser::buy`](crate::commands::browse::RecipeBrowser::buy).
    pub async fn submit(&self, form: BuyForm) -> Result<PurchaseReceipt> {
        if let Err(e) = form.validate() {
            self.svc.events.alert(Alert::new("Incomplete Form", INCOMPLETE));
            return Err(e);
        }
        let token = self.svc.token()?;
        let recipe_id = form.recipe.id;

        let result = async {
            let multipart = form.into_form().await?;
            self.svc.api.buy_recipe(&token, multipart).await
        }
        .await;

        let resp = result.map_err(|e| {
            self.svc
                .events
                .report(&e, "Something went wrong. Please try again.");
            e
        })?;

        let status = resp
            .purchase
            .map(|p| p.status)
            .unwrap_or(PurchaseStatus::Pending);
        self.overlay.mark_purchase(recipe_id, status);

        let message = resp
            .message
            .unwrap_or_else(|| "Purchase submitted.".to_string());
        tracing::info!(recipe_id = %recipe_id, ?status, "purchase submitted");
        self.svc.events.alert(Alert::success(message.clone()));
        Ok(PurchaseReceipt {
            recipe_id,
            status,
            message,
        })
    }
}
