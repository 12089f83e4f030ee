//! Plot account types

use serde::{Deserialize, Serialize};

/// One plot account (a named bundle of parcel shares) as read from the
/// ledger.
///
/// `parcel_ids` and `parcel_amounts` are index-aligned: `parcel_amounts[i]`
/// is the share amount held of `parcel_ids[i]`. Both are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotInfo {
    /// Contract-side account address holding the plot's parcel shares
    pub plot_account: String,

    /// Address of the plot's current holder
    pub plot_owner: String,

    /// Plot name, unique across all plots
    pub plot_name: String,

    /// Parcel token ids bundled in this plot, decimal strings
    pub parcel_ids: Vec<String>,

    /// Share amounts, index-aligned with `parcel_ids`, decimal strings
    pub parcel_amounts: Vec<String>,
}
