use super::record::OwnerType;

/// Derived fields the investment score reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub acreage: f64,
    pub zoning_fit_score: Option<u8>,
    pub owner_type: OwnerType,
    pub years_owned: Option<i32>,
}

/// Sum of independent bonuses, at most 5:
/// - +1 for acreage strictly between 1 and 5
/// - +2 for a zoning fitness of 4 or more (absent never qualifies)
/// - +1 for an entity owner
/// - +1 for more than 10 years owned (absent counts as 0)
pub fn investment_score(inputs: &ScoreInputs) -> u8 {
    let mut score = 0;
    if inputs.acreage > 1.0 && inputs.acreage < 5.0 {
        score += 1;
    }
    if inputs.zoning_fit_score.is_some_and(|fit| fit >= 4) {
        score += 2;
    }
    if inputs.owner_type == OwnerType::Entity {
        score += 1;
    }
    if inputs.years_owned.unwrap_or(0) > 10 {
        score += 1;
    }
    score
}
