//! Pre-aggregated statistics, fetched as tabular JSON.
//!
//! The backend computes everything; the client only names the report,
//! supplies the acting employee, and types the response channel. A denial
//! arrives from the wire as a bare English sentence in place of the JSON
//! array - the adapter translates the known sentences into `Denial`
//! variants so nothing above the seam string-matches.

use crate::backend::{Backend, Record};
use crate::error::OperationError;
use crate::session::Session;

/// Dataset-wide reports, administrator only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalReport {
    TopRevenueChains,
    PaymentMethodShare,
    FewestRoomChains,
    MostCapacityHotels,
    MostReservedHotels,
    BusiestMonthsByChain,
}

impl GlobalReport {
    pub const ALL: [Self; 6] = [
        Self::TopRevenueChains,
        Self::PaymentMethodShare,
        Self::FewestRoomChains,
        Self::MostCapacityHotels,
        Self::MostReservedHotels,
        Self::BusiestMonthsByChain,
    ];

    /// Path under `/dataops/`.
    pub fn path(self) -> &'static str {
        match self {
            Self::TopRevenueChains => "most/revenue",
            Self::PaymentMethodShare => "paymentmethod",
            Self::FewestRoomChains => "least/rooms",
            Self::MostCapacityHotels => "most/capacity",
            Self::MostReservedHotels => "most/reservation",
            Self::BusiestMonthsByChain => "most/profitmonth",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::TopRevenueChains => "Top 3 chains with the highest total revenue.",
            Self::PaymentMethodShare => "Total reservation percentage by payment method.",
            Self::FewestRoomChains => "Top 3 hotel chains with the least rooms.",
            Self::MostCapacityHotels => "Top 5 hotels with the most client capacity.",
            Self::MostReservedHotels => "Top 10% of the hotels that had the most reservations.",
            Self::BusiestMonthsByChain => "Top 3 month with the most reservation by chain.",
        }
    }
}

/// Per-hotel reports, available to every role (the backend decides whether
/// the acting employee may see the given hotel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotelReport {
    MostReservedHandicapRooms,
    LeastUnavailableRooms,
    TopCreditCardClients,
    HighestPaidRegulars,
    MostDiscountedClients,
    RoomTypeShare,
    LeastGuestRatioRooms,
}

impl HotelReport {
    pub const ALL: [Self; 7] = [
        Self::MostReservedHandicapRooms,
        Self::LeastUnavailableRooms,
        Self::TopCreditCardClients,
        Self::HighestPaidRegulars,
        Self::MostDiscountedClients,
        Self::RoomTypeShare,
        Self::LeastGuestRatioRooms,
    ];

    /// Final path segment under `/dataops/hotel/<hid>/`.
    pub fn segment(self) -> &'static str {
        match self {
            Self::MostReservedHandicapRooms => "handicaproom",
            Self::LeastUnavailableRooms => "leastreserve",
            Self::TopCreditCardClients => "mostcreditcard",
            Self::HighestPaidRegulars => "highestpaid",
            Self::MostDiscountedClients => "mostdiscount",
            Self::RoomTypeShare => "roomtype",
            Self::LeastGuestRatioRooms => "leastguests",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::MostReservedHandicapRooms => "Top 5 handicap rooms that were reserved the most.",
            Self::LeastUnavailableRooms => "Top 3 rooms that were the least time unavailable.",
            Self::TopCreditCardClients => {
                "Top 5 clients under 30 years old that made the most reservation with a credit card."
            }
            Self::HighestPaidRegulars => "Top 3 highest paid regular employees.",
            Self::MostDiscountedClients => "Top 5 clients that received the most discounts.",
            Self::RoomTypeShare => "Total reservation percentage by room type.",
            Self::LeastGuestRatioRooms => {
                "Top 3 rooms that were reserved that had the least guest-to-capacity ratio."
            }
        }
    }
}

/// An authorization denial the backend signals in place of report rows.
///
/// The wire sentences are a fixed contract; `message` reproduces them
/// bit-for-bit and `from_sentinel` recognizes nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotAdministrator,
    ChainNotAccessible,
    NotHotelEmployee,
}

impl Denial {
    pub fn message(self) -> &'static str {
        match self {
            Self::NotAdministrator => "Employee is not an Administrator",
            Self::ChainNotAccessible => "The hotel's chain is not accessible to this employee",
            Self::NotHotelEmployee => "User is not a regular employee of this hotel",
        }
    }

    pub fn from_sentinel(text: &str) -> Option<Self> {
        [
            Self::NotAdministrator,
            Self::ChainNotAccessible,
            Self::NotHotelEmployee,
        ]
        .into_iter()
        .find(|denial| denial.message() == text)
    }
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// What a report request produced. An empty table is valid data (the hotel
/// simply has nothing to show) and is distinct from a denial; transport
/// failures never reach this type.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Table(Vec<Record>),
    Denied(Denial),
}

impl ReportOutcome {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }
}

/// Fetch a dataset-wide report. Refused locally for non-administrators;
/// the backend still enforces the same rule with its sentinel.
pub async fn global(
    backend: &dyn Backend,
    session: &Session,
    report: GlobalReport,
) -> Result<ReportOutcome, OperationError> {
    if !session.role.can_view_global_reports() {
        return Err(OperationError::NotPermitted {
            role: session.role,
            action: "view global statistics".to_string(),
        });
    }
    Ok(backend.global_report(report, session.eid).await?)
}

/// Fetch a per-hotel report. Every role may ask; the backend decides
/// whether this employee can see this hotel.
pub async fn hotel(
    backend: &dyn Backend,
    session: &Session,
    hid: i64,
    report: HotelReport,
) -> Result<ReportOutcome, OperationError> {
    Ok(backend.hotel_report(report, hid, session.eid).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_translation_is_exact() {
        for denial in [
            Denial::NotAdministrator,
            Denial::ChainNotAccessible,
            Denial::NotHotelEmployee,
        ] {
            assert_eq!(Denial::from_sentinel(denial.message()), Some(denial));
        }
        assert_eq!(Denial::from_sentinel("employee is not an administrator"), None);
        assert_eq!(Denial::from_sentinel("Not Found"), None);
        assert_eq!(Denial::from_sentinel(""), None);
    }

    #[test]
    fn report_paths_are_stable() {
        assert_eq!(GlobalReport::TopRevenueChains.path(), "most/revenue");
        assert_eq!(GlobalReport::BusiestMonthsByChain.path(), "most/profitmonth");
        assert_eq!(HotelReport::LeastGuestRatioRooms.segment(), "leastguests");
        assert_eq!(GlobalReport::ALL.len(), 6);
        assert_eq!(HotelReport::ALL.len(), 7);
    }
}
