//! Cross-product expansion of a batch into authorization requests

use crate::types::{Actor, AuthorizationRequest, Resource};

/// Expand actors, relations and resources into one request per triple.
///
/// Requests come out resource-major, then actor, then relation. Duplicate
/// inputs are kept and identifiers are passed through untouched.
pub fn expand<A, R, N>(
    actor_ids: &[A],
    relations: &[R],
    resource_ids: &[N],
    actor_type: &str,
    resource_type: &str,
) -> Vec<AuthorizationRequest>
where
    A: AsRef<str>,
    R: AsRef<str>,
    N: AsRef<str>,
{
    let mut requests =
        Vec::with_capacity(actor_ids.len() * relations.len() * resource_ids.len());

    for resource_id in resource_ids {
        let resource = Resource::new(resource_type, resource_id.as_ref());

        for actor_id in actor_ids {
            let actor = Actor::new(actor_type, actor_id.as_ref());

            for relation in relations {
                requests.push(AuthorizationRequest::new(
                    actor.clone(),
                    relation.as_ref(),
                    resource.clone(),
                ));
            }
        }
    }

    requests
}
