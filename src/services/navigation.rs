use crate::models::wizard::{Activity, Breadcrumb, WizardStep};

/// Breadcrumb trail for `step`. Every step before it links back with the
/// parameters that step needs; the step itself is marked current.
pub fn breadcrumbs(
    step: WizardStep,
    site: &str,
    activity: Option<Activity>,
    queue_count: usize,
) -> Vec<Breadcrumb> {
    let activity_tag = activity.map(|a| a.as_str()).unwrap_or_default();
    let trail = [
        (WizardStep::Start, format!("Start ({site})"), "/".to_string()),
        (
            WizardStep::Scope,
            match activity {
                Some(activity) if step > WizardStep::Scope => {
                    format!("Scope ({})", activity.title())
                }
                _ => "Scope".to_string(),
            },
            format!("/scope?url={site}"),
        ),
        (
            WizardStep::SupportQueues,
            "Support Queues".to_string(),
            format!("/support-queues?url={site}&activity={activity_tag}"),
        ),
        (
            WizardStep::ImpactRationale,
            "Impact Rationale".to_string(),
            format!("/impact-rationale?url={site}&activity={activity_tag}&count={queue_count}"),
        ),
        (
            WizardStep::Productivity,
            "Productivity".to_string(),
            format!("/productivity?url={site}&activity={activity_tag}"),
        ),
    ];

    trail
        .into_iter()
        .take_while(|(crumb_step, _, _)| *crumb_step <= step)
        .map(|(crumb_step, label, href)| {
            let current = crumb_step == step;
            Breadcrumb {
                label,
                href: (!current).then_some(href),
                current,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_trail_has_two_crumbs() {
        let crumbs = breadcrumbs(WizardStep::Scope, "acme.io", None, 0);
        assert_eq!(crumbs.len(), 2);
        assert_eq!(crumbs[0].label, "Start (acme.io)");
        assert_eq!(crumbs[0].href.as_deref(), Some("/"));
        assert_eq!(crumbs[1].label, "Scope");
        assert!(crumbs[1].current);
        assert!(crumbs[1].href.is_none());
    }

    #[test]
    fn productivity_trail_links_every_previous_step() {
        let crumbs = breadcrumbs(
            WizardStep::Productivity,
            "acme.io",
            Some(Activity::AgentifyCustomerSupport),
            4,
        );
        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Start (acme.io)",
                "Scope (Agentify Customer Support)",
                "Support Queues",
                "Impact Rationale",
                "Productivity",
            ]
        );
        assert_eq!(
            crumbs[3].href.as_deref(),
            Some("/impact-rationale?url=acme.io&activity=agentify&count=4")
        );
        assert!(crumbs[4].current);
        assert_eq!(crumbs.iter().filter(|c| c.current).count(), 1);
    }
}
