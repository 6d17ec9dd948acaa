//! Record traits for filtering and sorting

use chrono::NaiveDate;
use std::borrow::Cow;

use crate::core::entity::{DonationRequest, Donor, Funding};

/// Trait for records that the list query engine can search, filter and sort
///
/// Each record type designates one text field for substring search, exposes
/// named fields for equality filters, and names the date used by the
/// `Newest`/`Oldest` sort keys.
pub trait Queryable {
    /// Text matched by the search term
    fn search_text(&self) -> &str;

    /// Value of a named field for equality filtering
    ///
    /// Returns `None` for fields the record does not have; filters on such
    /// fields are ignored.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Date used for date-ordered sorting
    fn sort_date(&self) -> Option<NaiveDate>;

    /// Blood group used by the blood-group sort key
    fn blood_group_key(&self) -> Option<&str> {
        None
    }

    /// District used by the district sort key
    fn district_key(&self) -> Option<&str> {
        None
    }
}

impl Queryable for DonationRequest {
    fn search_text(&self) -> &str {
        &self.recipient_name
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "blood_group" | "bloodGroup" => Some(Cow::Borrowed(self.blood_group.as_str())),
            "district" => Some(Cow::Borrowed(&self.district)),
            "upazila" => Some(Cow::Borrowed(&self.upazila)),
            "status" => Some(Cow::Borrowed(self.status.as_str())),
            "requester_email" | "requesterEmail" => Some(Cow::Borrowed(&self.requester_email)),
            _ => None,
        }
    }

    fn sort_date(&self) -> Option<NaiveDate> {
        Some(self.donation_date)
    }

    fn blood_group_key(&self) -> Option<&str> {
        Some(self.blood_group.as_str())
    }

    fn district_key(&self) -> Option<&str> {
        Some(&self.district)
    }
}

impl Queryable for Donor {
    fn search_text(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "blood_group" | "bloodGroup" => Some(Cow::Borrowed(self.blood_group.as_str())),
            "district" => Some(Cow::Borrowed(&self.district)),
            "upazila" => Some(Cow::Borrowed(&self.upazila)),
            "status" => Some(Cow::Borrowed(self.status.as_str())),
            "role" => Some(Cow::Borrowed(self.role.as_str())),
            "email" => Some(Cow::Borrowed(&self.email)),
            _ => None,
        }
    }

    fn sort_date(&self) -> Option<NaiveDate> {
        None
    }

    fn blood_group_key(&self) -> Option<&str> {
        Some(self.blood_group.as_str())
    }

    fn district_key(&self) -> Option<&str> {
        Some(&self.district)
    }
}

impl Queryable for Funding {
    fn search_text(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "email" => Some(Cow::Borrowed(&self.email)),
            "amount_cents" => Some(Cow::Owned(self.amount_cents.to_string())),
            _ => None,
        }
    }

    fn sort_date(&self) -> Option<NaiveDate> {
        Some(self.funded_at.date_naive())
    }
}
