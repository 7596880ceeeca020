use crate::session::donate::DonationForm;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DonationRequest {
    pub donor_name: Option<String>,
    pub amount: Decimal,
    pub message: Option<String>,
    pub payment_method: Option<String>,
    /// Inline data URL of the payment capture, when one was attached.
    pub proof_image: Option<String>,
}

impl DonationRequest {
    pub fn into_form(self) -> DonationForm {
        DonationForm {
            donor_name: self.donor_name,
            amount: self.amount,
            message: self.message,
            payment_method: self.payment_method,
            proof_image: self.proof_image,
        }
    }
}
