//! Hierarchy directory — ancestor-chain resolution over a configuration
//! snapshot.
//!
//! The directory holds the reseller tree as adjacency-by-id: each node
//! carries a parent *reference*, resolved by lookup, never a pointer.
//! Snapshots come from the administration collaborator and are validated
//! fail-closed at load time — a snapshot that delegates more share than a
//! parent owns never becomes visible to settlement.

use std::collections::HashMap;

use parking_lot::RwLock;
use wagerbook_types::{AccountNode, Result, UserId, WagerbookError, constants};

/// Read-mostly directory of the account hierarchy.
///
/// `chain_of` is the resolver the settlement plane uses: given a bet
/// owner, it returns the ancestor chain from immediate parent up to the
/// platform root, each node carrying its commission profile.
pub struct HierarchyDirectory {
    nodes: RwLock<HashMap<UserId, AccountNode>>,
    /// Traversal bound; any chain longer than this is treated as a cycle.
    max_chain_depth: usize,
}

impl HierarchyDirectory {
    /// Create an empty directory with the default traversal bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_depth(constants::MAX_CHAIN_DEPTH)
    }

    /// Create an empty directory with a custom traversal bound.
    #[must_use]
    pub fn with_max_depth(max_chain_depth: usize) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            max_chain_depth,
        }
    }

    /// Replace the directory contents with a validated snapshot.
    ///
    /// Validation is fail-closed: if any node fails a check, the previous
    /// snapshot stays in place untouched.
    ///
    /// # Errors
    /// - `Configuration` if two nodes share an id.
    /// - `BrokenHierarchy` if a parent reference does not resolve or a
    ///   parent chain exceeds the depth bound (cycle).
    /// - `CommissionOverflow` if a profile is internally inconsistent or a
    ///   child's share exceeds what its parent delegates.
    pub fn load_snapshot(&self, snapshot: Vec<AccountNode>) -> Result<()> {
        let mut staged: HashMap<UserId, AccountNode> = HashMap::with_capacity(snapshot.len());
        for node in snapshot {
            if staged.insert(node.user_id, node.clone()).is_some() {
                return Err(WagerbookError::Configuration(format!(
                    "duplicate account id {} in snapshot",
                    node.user_id
                )));
            }
        }
        for node in staged.values() {
            Self::validate_node(&staged, node)?;
            Self::walk_to_root(&staged, node.user_id, self.max_chain_depth).map(|_| ())?;
        }

        let count = staged.len();
        *self.nodes.write() = staged;
        tracing::info!(accounts = count, "Hierarchy snapshot loaded");
        Ok(())
    }

    /// Insert or replace a single node, revalidating it against the
    /// current snapshot. Used by the administration collaborator for
    /// incremental updates.
    ///
    /// # Errors
    /// Same checks as [`Self::load_snapshot`], applied to the one node.
    pub fn upsert(&self, node: AccountNode) -> Result<()> {
        let mut nodes = self.nodes.write();
        let previous = nodes.insert(node.user_id, node.clone());
        let revert = |nodes: &mut HashMap<UserId, AccountNode>| match previous {
            Some(prev) => {
                nodes.insert(node.user_id, prev);
            }
            None => {
                nodes.remove(&node.user_id);
            }
        };

        if let Err(err) = Self::validate_node(&nodes, &node)
            .and_then(|()| Self::walk_to_root(&nodes, node.user_id, self.max_chain_depth).map(|_| ()))
        {
            revert(&mut nodes);
            return Err(err);
        }
        Ok(())
    }

    /// Look up a single node.
    #[must_use]
    pub fn node(&self, user_id: UserId) -> Option<AccountNode> {
        self.nodes.read().get(&user_id).cloned()
    }

    /// The ancestor chain of `user_id`, ordered from immediate parent up
    /// to the platform root. Pure read.
    ///
    /// # Errors
    /// Returns `BrokenHierarchy` if the user or any ancestor does not
    /// resolve, or if the chain exceeds the depth bound (cycle guard).
    pub fn chain_of(&self, user_id: UserId) -> Result<Vec<AccountNode>> {
        let nodes = self.nodes.read();
        let mut chain = Self::walk_to_root(&nodes, user_id, self.max_chain_depth)?;
        chain.remove(0); // drop the user itself; callers want ancestors only
        Ok(chain)
    }

    /// Number of accounts in the directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Share-delegation checks for one node against its parent.
    fn validate_node(nodes: &HashMap<UserId, AccountNode>, node: &AccountNode) -> Result<()> {
        if !node.profile.is_consistent() {
            return Err(WagerbookError::CommissionOverflow {
                user_id: node.user_id,
                reason: format!(
                    "profile delegates {}% of an owned {}%",
                    node.profile.available_share_percent, node.profile.share_percent
                ),
            });
        }
        if let Some(parent_id) = node.parent {
            let parent =
                nodes
                    .get(&parent_id)
                    .ok_or_else(|| WagerbookError::BrokenHierarchy {
                        user_id: node.user_id,
                        reason: format!("parent {parent_id} does not resolve"),
                    })?;
            if node.profile.share_percent > parent.profile.available_share_percent {
                return Err(WagerbookError::CommissionOverflow {
                    user_id: node.user_id,
                    reason: format!(
                        "share {}% exceeds the {}% delegated by parent {}",
                        node.profile.share_percent,
                        parent.profile.available_share_percent,
                        parent.code,
                    ),
                });
            }
        }
        Ok(())
    }

    /// Walk parent references from `user_id` to the root, inclusive of the
    /// starting node. Bounded by `max_depth` to turn cycles into errors.
    fn walk_to_root(
        nodes: &HashMap<UserId, AccountNode>,
        user_id: UserId,
        max_depth: usize,
    ) -> Result<Vec<AccountNode>> {
        let mut chain = Vec::new();
        let mut cursor = Some(user_id);
        while let Some(current_id) = cursor {
            if chain.len() > max_depth {
                return Err(WagerbookError::BrokenHierarchy {
                    user_id,
                    reason: format!("chain exceeds {max_depth} levels; cycle suspected"),
                });
            }
            let node = nodes
                .get(&current_id)
                .ok_or_else(|| WagerbookError::BrokenHierarchy {
                    user_id,
                    reason: format!("account {current_id} does not resolve"),
                })?;
            cursor = node.parent;
            chain.push(node.clone());
        }
        Ok(chain)
    }
}

impl Default for HierarchyDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use wagerbook_types::{CommissionPlan, CommissionProfile};

    use super::*;

    fn node(user_id: UserId, parent: Option<UserId>, share: i64, available: i64) -> AccountNode {
        AccountNode {
            user_id,
            code: format!("ACC-{}", &user_id.to_string()[..8]),
            parent,
            credit_limit: Decimal::new(10_000, 0),
            profile: CommissionProfile {
                share_percent: Decimal::new(share, 0),
                available_share_percent: Decimal::new(available, 0),
                sports: CommissionPlan::NoCommission,
                casino: CommissionPlan::NoCommission,
            },
        }
    }

    /// root(100/80) -> agent(50/30) -> player(10/0)
    fn three_level() -> (HierarchyDirectory, UserId, UserId, UserId) {
        let root = UserId::new();
        let agent = UserId::new();
        let player = UserId::new();
        let dir = HierarchyDirectory::new();
        dir.load_snapshot(vec![
            node(root, None, 100, 80),
            node(agent, Some(root), 50, 30),
            node(player, Some(agent), 10, 0),
        ])
        .unwrap();
        (dir, root, agent, player)
    }

    #[test]
    fn chain_runs_parent_to_root() {
        let (dir, root, agent, player) = three_level();
        let chain = dir.chain_of(player).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].user_id, agent);
        assert_eq!(chain[1].user_id, root);
        assert!(chain[1].is_root());
    }

    #[test]
    fn root_chain_is_empty() {
        let (dir, root, _, _) = three_level();
        assert!(dir.chain_of(root).unwrap().is_empty());
    }

    #[test]
    fn unknown_user_is_broken_hierarchy() {
        let (dir, _, _, _) = three_level();
        let err = dir.chain_of(UserId::new()).unwrap_err();
        assert!(matches!(err, WagerbookError::BrokenHierarchy { .. }));
    }

    #[test]
    fn dangling_parent_rejected_at_load() {
        let dir = HierarchyDirectory::new();
        let orphan = node(UserId::new(), Some(UserId::new()), 10, 0);
        let err = dir.load_snapshot(vec![orphan]).unwrap_err();
        assert!(matches!(err, WagerbookError::BrokenHierarchy { .. }));
        assert!(dir.is_empty(), "failed snapshot must not become visible");
    }

    #[test]
    fn cycle_rejected_at_load() {
        let a = UserId::new();
        let b = UserId::new();
        let dir = HierarchyDirectory::new();
        let err = dir
            .load_snapshot(vec![node(a, Some(b), 10, 0), node(b, Some(a), 10, 0)])
            .unwrap_err();
        assert!(matches!(err, WagerbookError::BrokenHierarchy { .. }));
    }

    #[test]
    fn over_delegation_rejected_at_load() {
        let root = UserId::new();
        let greedy = UserId::new();
        let dir = HierarchyDirectory::new();
        // Parent delegates 80%, child claims 90%.
        let err = dir
            .load_snapshot(vec![
                node(root, None, 100, 80),
                node(greedy, Some(root), 90, 0),
            ])
            .unwrap_err();
        assert!(matches!(err, WagerbookError::CommissionOverflow { .. }));
    }

    #[test]
    fn inconsistent_profile_rejected() {
        let root = UserId::new();
        let dir = HierarchyDirectory::new();
        // Delegates more than it owns.
        let err = dir.load_snapshot(vec![node(root, None, 40, 60)]).unwrap_err();
        assert!(matches!(err, WagerbookError::CommissionOverflow { .. }));
    }

    #[test]
    fn duplicate_id_rejected() {
        let root = UserId::new();
        let dir = HierarchyDirectory::new();
        let err = dir
            .load_snapshot(vec![node(root, None, 100, 80), node(root, None, 100, 80)])
            .unwrap_err();
        assert!(matches!(err, WagerbookError::Configuration(_)));
    }

    #[test]
    fn upsert_adds_and_validates() {
        let (dir, _, agent, _) = three_level();
        let newcomer = node(UserId::new(), Some(agent), 20, 0);
        dir.upsert(newcomer.clone()).unwrap();
        let chain = dir.chain_of(newcomer.user_id).unwrap();
        assert_eq!(chain.len(), 2);

        // Over-delegating upsert is rejected and rolled back.
        let greedy = node(UserId::new(), Some(agent), 90, 0);
        let err = dir.upsert(greedy.clone()).unwrap_err();
        assert!(matches!(err, WagerbookError::CommissionOverflow { .. }));
        assert!(dir.node(greedy.user_id).is_none());
    }

    #[test]
    fn depth_bound_catches_long_chains() {
        let dir = HierarchyDirectory::with_max_depth(3);
        let ids: Vec<UserId> = (0..6).map(|_| UserId::new()).collect();
        let snapshot: Vec<AccountNode> = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let parent = if i == 0 { None } else { Some(ids[i - 1]) };
                node(id, parent, 100, 100)
            })
            .collect();
        let err = dir.load_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, WagerbookError::BrokenHierarchy { .. }));
    }
}
