use serde::Serialize;
use crate::domain::models::{
    family::Family,
    proposal::{ProposalDay, WeekProposal},
};

#[derive(Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub display_name: String,
    pub parent_role: Option<String>,
}

#[derive(Serialize)]
pub struct FamilyResponse {
    #[serde(flatten)]
    pub family: Family,
    pub members: Vec<MemberResponse>,
    pub parent_a: Option<String>,
    pub parent_b: Option<String>,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub week_start: String,
    pub days: Vec<ProposalDay>,
}

#[derive(Serialize)]
pub struct ApprovalResponse {
    /// `recorded`, `committed` or `already_approved`.
    pub outcome: &'static str,
    pub proposal: WeekProposal,
}
