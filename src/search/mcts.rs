//! Monte Carlo tree search with UCT selection.
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by index,
//! so growing the tree never invalidates a parent link. Each node owns its
//! own board copy; ancestors are never mutated. The whole tree, the
//! position cache, and the rollout RNG die with the search call.

use std::path::PathBuf;
use std::time::Instant;

use crate::board::board::{Board, Move};
use crate::board::piece::Color;
use crate::errors::ChessError;
use crate::evaluator::{Evaluator, GameStatus};
use crate::move_generation::MoveGenerator;
use crate::move_selector::MoveSelector;
use crate::search::cache::SearchCache;
use crate::search::dot;

/// Per-search tuning. `exploration_constant` of zero reproduces pure
/// exploitation; the usual choice is sqrt(2).
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub time_limit_ms: u64,
    pub exploration_constant: f32,
    pub debug: bool,
    /// Dump the finished tree as a GraphViz digraph to this path.
    pub dot_file: Option<PathBuf>,
    /// Annotate DOT nodes with visit counts, values and UCT scores.
    pub verbose_dot: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 1000,
            exploration_constant: std::f32::consts::SQRT_2,
            debug: false,
            dot_file: None,
            verbose_dot: false,
        }
    }
}

pub(crate) type NodeId = usize;

pub(crate) struct Node {
    pub(crate) board: Board,
    /// Side to move in this node's position.
    pub(crate) player: Color,
    /// The move that produced this position; null at the root.
    pub(crate) last_move: Move,
    pub(crate) parent: Option<NodeId>,
    pub(crate) expand_count: u32,
    pub(crate) value: f32,
    pub(crate) unexplored_children: Vec<Move>,
    pub(crate) children: Vec<NodeId>,
}

/// Outcome of one search call.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// `None` when the root had no legal moves or the budget allowed no
    /// expansion at all.
    pub best_move: Option<Move>,
    pub iterations: u64,
    pub tree_size: usize,
    pub tree_depth: usize,
}

pub struct Mcts {
    config: SearchConfig,
    selector: MoveSelector,
}

impl Mcts {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            selector: MoveSelector::new(),
        }
    }

    /// Deterministic variant for tests: the rollout RNG is seeded.
    pub fn with_selector(config: SearchConfig, selector: MoveSelector) -> Self {
        Self { config, selector }
    }

    /// Grow a tree from `board` until the wall-clock budget expires and
    /// return the best-judged move for `player`.
    pub fn uct_search(
        &mut self,
        board: &Board,
        player: Color,
    ) -> Result<SearchResult, ChessError> {
        let mut cache = SearchCache::new();
        let mut tree = SearchTree::new(self.config.exploration_constant);

        let root = tree.push(Node {
            board: *board,
            player,
            last_move: Move::null(),
            parent: None,
            expand_count: 0,
            value: 0.0,
            unexplored_children: Vec::new(),
            children: Vec::new(),
        });
        tree.nodes[root].unexplored_children =
            MoveGenerator::new(board).legal_moves_cached(player, &mut cache);

        let start = Instant::now();
        let mut iterations = 0u64;
        while (start.elapsed().as_millis() as u64) < self.config.time_limit_ms {
            let expanded = tree.tree_policy(root, &mut cache, &mut self.selector)?;
            let Some(node) = expanded else {
                // Nothing left to expand this round; spend the rest of the
                // budget anyway, matching the wall-clock contract.
                continue;
            };
            let value = tree.default_policy(node, &mut cache, &mut self.selector)?;
            tree.back_propagate(node, value);
            iterations += 1;
        }

        if self.config.debug {
            eprintln!(
                "search: {iterations} iterations, {} nodes, {} cache entries ({} hits)",
                tree.nodes.len(),
                cache.len(),
                cache.hits()
            );
        }

        if let Some(path) = &self.config.dot_file {
            dot::write_dot_file(&tree, path, self.config.verbose_dot)?;
        }

        let best_move = tree.best_child(root).map(|id| tree.nodes[id].last_move);
        Ok(SearchResult {
            best_move,
            iterations,
            tree_size: tree.nodes.len(),
            tree_depth: tree.depth(),
        })
    }
}

pub(crate) struct SearchTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) exploration_constant: f32,
}

impl SearchTree {
    pub(crate) fn new(exploration_constant: f32) -> Self {
        Self {
            nodes: Vec::new(),
            exploration_constant,
        }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Descend from `root` by UCT until a node with unexplored children is
    /// found, then expand it. `None` when the reachable tree is exhausted.
    fn tree_policy(
        &mut self,
        root: NodeId,
        cache: &mut SearchCache,
        selector: &mut MoveSelector,
    ) -> Result<Option<NodeId>, ChessError> {
        let mut current = root;
        while !self.nodes[current].children.is_empty() {
            if !self.nodes[current].unexplored_children.is_empty() {
                return self.expand(current, cache, selector);
            }
            match self.best_child(current) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        self.expand(current, cache, selector)
    }

    /// Pop one untried move at random, apply it, and attach the child with
    /// its legal move list precomputed.
    fn expand(
        &mut self,
        id: NodeId,
        cache: &mut SearchCache,
        selector: &mut MoveSelector,
    ) -> Result<Option<NodeId>, ChessError> {
        let Some(index) = selector.select_uniform(self.nodes[id].unexplored_children.len())
        else {
            return Ok(None);
        };
        let mv = self.nodes[id].unexplored_children.remove(index);

        let player = self.nodes[id].player;
        let Some(next_board) = self.nodes[id].board.apply_move(&mv, player) else {
            return Err(ChessError::IllegalMoveApplied(format!(
                "{mv} for {player:?}"
            )));
        };

        let child_player = player.opposite();
        let unexplored =
            MoveGenerator::new(&next_board).legal_moves_cached(child_player, cache);
        let child = self.push(Node {
            board: next_board,
            player: child_player,
            last_move: mv,
            parent: Some(id),
            expand_count: 0,
            value: 0.0,
            unexplored_children: unexplored,
            children: Vec::new(),
        });
        self.nodes[id].children.push(child);
        Ok(Some(child))
    }

    /// Highest-UCT child; unvisited children count as infinitely good.
    pub(crate) fn best_child(&self, id: NodeId) -> Option<NodeId> {
        let parent_count = self.nodes[id].expand_count;
        let mut best: Option<(NodeId, f32)> = None;
        for &child in &self.nodes[id].children {
            let score = self.uct_score(parent_count, child);
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((child, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    pub(crate) fn uct_score(&self, parent_count: u32, child: NodeId) -> f32 {
        let node = &self.nodes[child];
        if node.expand_count == 0 {
            return f32::INFINITY;
        }
        let count = node.expand_count as f32;
        let exploit = node.value / count;
        let explore = self.exploration_constant
            * (2.0 * (parent_count.max(1) as f32).ln() / count).sqrt();
        exploit + explore
    }

    /// Random playout from the node's position until the evaluator calls
    /// the game; the returned value is material from the node's side.
    fn default_policy(
        &self,
        id: NodeId,
        cache: &mut SearchCache,
        selector: &mut MoveSelector,
    ) -> Result<f32, ChessError> {
        let node_player = self.nodes[id].player;
        let mut board = self.nodes[id].board;
        let mut player = node_player;

        let mut evaluation = Evaluator::new(&board).evaluate(player, cache);
        while evaluation.status == GameStatus::Normal {
            let Some(mv) = selector.select_move(&board, player, cache) else {
                break;
            };
            let Some(next) = board.apply_move(&mv, player) else {
                return Err(ChessError::IllegalMoveApplied(format!(
                    "{mv} for {player:?} in rollout"
                )));
            };
            board = next;
            player = player.opposite();
            evaluation = Evaluator::new(&board).evaluate(player, cache);
        }

        Ok(Evaluator::new(&board).evaluate(node_player, cache).value)
    }

    /// Add the rollout value and a visit to every node on the path to the
    /// root. The value is deliberately not negated per ply.
    fn back_propagate(&mut self, id: NodeId, value: f32) {
        let mut current = Some(id);
        while let Some(node) = current {
            self.nodes[node].expand_count += 1;
            self.nodes[node].value += value;
            current = self.nodes[node].parent;
        }
    }

    /// Depth of the deepest node, in plies from the root.
    pub(crate) fn depth(&self) -> usize {
        // Parents always precede children in the arena.
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for id in 0..self.nodes.len() {
            if let Some(parent) = self.nodes[id].parent {
                depths[id] = depths[parent] + 1;
                max = max.max(depths[id]);
            }
        }
        max
    }

    pub(crate) fn node_depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id].parent;
        while let Some(node) = current {
            depth += 1;
            current = self.nodes[node].parent;
        }
        depth
    }
}
