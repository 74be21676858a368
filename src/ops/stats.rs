use std::collections::HashMap;

use crate::model::project::Project;

/// Dashboard summary of a project collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    /// Lower-cased tag used by the most projects; earliest seen wins ties
    pub most_used_tech: Option<String>,
    pub unique_techs: usize,
}

pub fn compute_stats<'a, I>(projects: I) -> DashboardStats
where
    I: IntoIterator<Item = &'a Project>,
{
    let mut total = 0;
    // Tag -> (count, first-seen order)
    let mut freq: HashMap<String, (usize, usize)> = HashMap::new();

    for project in projects {
        total += 1;
        for tag in project.tech_tags() {
            let order = freq.len();
            let slot = freq.entry(tag.to_lowercase()).or_insert((0, order));
            slot.0 += 1;
        }
    }

    let most_used_tech = freq
        .iter()
        .max_by(|(_, (ca, oa)), (_, (cb, ob))| ca.cmp(cb).then(ob.cmp(oa)))
        .map(|(tag, _)| tag.clone());

    DashboardStats {
        total,
        most_used_tech,
        unique_techs: freq.len(),
    }
}
