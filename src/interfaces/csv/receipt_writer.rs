use crate::domain::receipt::PaymentReceipt;
use crate::error::Result;
use std::io::Write;

/// Writes a receipt report as CSV.
pub struct ReceiptWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReceiptWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(sink),
        }
    }

    pub fn write_receipts(&mut self, receipts: Vec<PaymentReceipt>) -> Result<()> {
        self.writer
            .write_record(["id", "user_id", "plan_type", "amount", "status", "admin_notes"])?;
        for receipt in receipts {
            self.writer.write_record([
                receipt.id.as_str(),
                &receipt.user_id,
                &receipt.plan_type.to_string(),
                &receipt.amount.to_string(),
                &receipt.status.to_string(),
                receipt.admin_notes.as_deref().unwrap_or(""),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::receipt::{PaymentSubmission, PlanType, ReceiptId, ReceiptStatus};

    #[test]
    fn test_writer_output() {
        let submission = PaymentSubmission {
            user_id: "u1".to_string(),
            plan_type: PlanType::Single,
            amount: 50,
            receipt_url: "r.png".to_string(),
            user_email: None,
            user_name: None,
        };
        let mut receipt = PaymentReceipt::from_submission(ReceiptId::from("rcpt-1-abc"), &submission);
        receipt
            .transition(ReceiptStatus::Approved, Some("looks good".to_string()))
            .unwrap();

        let mut buffer = Vec::new();
        let mut writer = ReceiptWriter::new(&mut buffer);
        writer.write_receipts(vec![receipt]).unwrap();
        drop(writer);

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("id,user_id,plan_type,amount,status,admin_notes"));
        assert!(output.contains("rcpt-1-abc,u1,single,50,approved,looks good"));
    }
}
