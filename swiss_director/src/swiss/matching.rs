//! Maximum matching on the graph of fresh pairings.
//!
//! Vertices are seats in pairing order and an edge joins two seats that have
//! not met yet. Edmonds' blossom search finds augmenting paths, which lets the
//! pairing engine decide up front whether a rematch-free round exists and then
//! commit pairs one at a time without ever walking into a dead end.

use std::collections::VecDeque;

/// Adjacency lists, each sorted ascending by seat index
pub type Adjacency = Vec<Vec<usize>>;

/// A matching over the live vertices of a fixed graph
#[derive(Debug, Clone)]
pub struct Matching<'a> {
    adjacency: &'a [Vec<usize>],
    alive: Vec<bool>,
    mate: Vec<Option<usize>>,
}

impl<'a> Matching<'a> {
    /// Empty matching with every vertex live
    pub fn new(adjacency: &'a [Vec<usize>]) -> Self {
        let n = adjacency.len();
        Self {
            adjacency,
            alive: vec![true; n],
            mate: vec![None; n],
        }
    }

    /// Grow to a maximum matching and return its size
    pub fn maximize(&mut self) -> usize {
        for v in 0..self.mate.len() {
            if self.alive[v] && self.mate[v].is_none() {
                self.augment(v);
            }
        }
        self.size()
    }

    /// Matched pairs among live vertices
    pub fn size(&self) -> usize {
        (0..self.mate.len())
            .filter(|&v| self.alive[v] && self.mate[v].is_some())
            .count()
            / 2
    }

    #[cfg(test)]
    pub fn mate(&self, v: usize) -> Option<usize> {
        self.mate[v]
    }

    pub fn is_alive(&self, v: usize) -> bool {
        self.alive[v]
    }

    /// Live vertices left without a partner
    pub fn exposed(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.mate.len()).filter(|&v| self.alive[v] && self.mate[v].is_none())
    }

    /// Take `v` out of the graph, unmatching its partner
    pub fn remove(&mut self, v: usize) {
        self.alive[v] = false;
        if let Some(partner) = self.mate[v].take() {
            self.mate[partner] = None;
        }
    }

    /// Whether some maximum matching leaves `v` unmatched. Assumes `self`
    /// is already maximum.
    pub fn can_leave_exposed(&self, v: usize) -> bool {
        let Some(partner) = self.mate[v] else {
            return true;
        };
        let mut trial = self.clone();
        trial.remove(v);
        trial.augment(partner)
    }

    /// Match `a` with `b` and remove both, provided every other exposed
    /// vertex stays matchable. Leaves `self` untouched on failure.
    pub fn take_pair(&mut self, a: usize, b: usize) -> bool {
        if self.mate[a] == Some(b) {
            self.remove(a);
            self.remove(b);
            return true;
        }

        let before = self.exposed().count();
        let mut trial = self.clone();
        let partners = [trial.mate[a], trial.mate[b]];
        trial.remove(a);
        trial.remove(b);
        for partner in partners.into_iter().flatten() {
            if trial.mate[partner].is_none() {
                trial.augment(partner);
            }
        }

        if trial.exposed().count() <= before {
            *self = trial;
            true
        } else {
            false
        }
    }

    /// Look for an augmenting path from the exposed vertex `root` and flip it
    fn augment(&mut self, root: usize) -> bool {
        let mut tree = BlossomTree::new(self.mate.len());
        match tree.find_path(self, root) {
            Some(end) => {
                let mut v = Some(end);
                while let Some(cur) = v {
                    let Some(prev) = tree.parent[cur] else {
                        break;
                    };
                    let next = self.mate[prev];
                    self.mate[cur] = Some(prev);
                    self.mate[prev] = Some(cur);
                    v = next;
                }
                true
            }
            None => false,
        }
    }
}

/// Alternating tree grown from one root, with blossoms contracted by base
struct BlossomTree {
    parent: Vec<Option<usize>>,
    base: Vec<usize>,
    in_tree: Vec<bool>,
    queue: VecDeque<usize>,
}

impl BlossomTree {
    fn new(n: usize) -> Self {
        Self {
            parent: vec![None; n],
            base: (0..n).collect(),
            in_tree: vec![false; n],
            queue: VecDeque::new(),
        }
    }

    /// Exposed vertex at the far end of an augmenting path, if one exists
    fn find_path(&mut self, matching: &Matching<'_>, root: usize) -> Option<usize> {
        self.in_tree[root] = true;
        self.queue.push_back(root);

        while let Some(v) = self.queue.pop_front() {
            for &to in &matching.adjacency[v] {
                if !matching.alive[to]
                    || self.base[v] == self.base[to]
                    || matching.mate[v] == Some(to)
                {
                    continue;
                }

                let outer = to == root || matching.mate[to].is_some_and(|m| self.parent[m].is_some());
                if outer {
                    self.contract(matching, v, to);
                } else if self.parent[to].is_none() {
                    self.parent[to] = Some(v);
                    match matching.mate[to] {
                        None => return Some(to),
                        Some(m) => {
                            self.in_tree[m] = true;
                            self.queue.push_back(m);
                        }
                    }
                }
            }
        }

        None
    }

    /// Shrink the odd cycle closed by edge `v`-`to` onto its base
    fn contract(&mut self, matching: &Matching<'_>, v: usize, to: usize) {
        let base = self.common_base(matching, v, to);
        let mut blossom = vec![false; self.base.len()];
        self.mark_path(matching, v, base, to, &mut blossom);
        self.mark_path(matching, to, base, v, &mut blossom);

        for i in 0..self.base.len() {
            if blossom[self.base[i]] {
                self.base[i] = base;
                if !self.in_tree[i] {
                    self.in_tree[i] = true;
                    self.queue.push_back(i);
                }
            }
        }
    }

    fn common_base(&self, matching: &Matching<'_>, mut a: usize, mut b: usize) -> usize {
        let mut seen = vec![false; self.base.len()];
        loop {
            a = self.base[a];
            seen[a] = true;
            match matching.mate[a].and_then(|m| self.parent[m]) {
                Some(next) => a = next,
                None => break,
            }
        }
        loop {
            b = self.base[b];
            if seen[b] {
                return b;
            }
            match matching.mate[b].and_then(|m| self.parent[m]) {
                Some(next) => b = next,
                None => return b,
            }
        }
    }

    fn mark_path(
        &mut self,
        matching: &Matching<'_>,
        mut v: usize,
        base: usize,
        mut child: usize,
        blossom: &mut [bool],
    ) {
        while self.base[v] != base {
            let Some(m) = matching.mate[v] else {
                break;
            };
            blossom[self.base[v]] = true;
            blossom[self.base[m]] = true;
            self.parent[v] = Some(child);
            child = m;
            let Some(next) = self.parent[m] else {
                break;
            };
            v = next;
        }
    }
}
