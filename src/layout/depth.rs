use crate::error::StructuralError;

use super::{SankeyLink, SankeyNode};

// Frontier layering: every node starts in round zero and is re-queued one
// round past each predecessor, so the final round a node is visited in is the
// longest path reaching it. A graph with n nodes is layered within n rounds;
// needing more means the frontier is chasing a cycle.

pub(super) fn assign_depths<N, L>(
    nodes: &mut [SankeyNode<N>],
    links: &[SankeyLink<L>],
) -> Result<(), StructuralError> {
    let mut current: Vec<usize> = (0..nodes.len()).collect();
    let mut next: Vec<usize> = Vec::new();
    let mut queued = vec![false; nodes.len()];

    let mut depth = 0;
    while !current.is_empty() {
        if depth >= nodes.len() {
            return Err(cycle_error(nodes, &current));
        }

        for &index in &current {
            nodes[index].depth = depth;
            for &link in &nodes[index].source_links {
                let target = links[link].target;
                if !queued[target] {
                    queued[target] = true;
                    next.push(target);
                }
            }
        }

        depth += 1;
        current.clear();
        std::mem::swap(&mut current, &mut next);
        for &index in &current {
            queued[index] = false;
        }
    }

    Ok(())
}

pub(super) fn assign_heights<N, L>(
    nodes: &mut [SankeyNode<N>],
    links: &[SankeyLink<L>],
) -> Result<(), StructuralError> {
    let mut current: Vec<usize> = (0..nodes.len()).collect();
    let mut next: Vec<usize> = Vec::new();
    let mut queued = vec![false; nodes.len()];

    let mut height = 0;
    while !current.is_empty() {
        if height >= nodes.len() {
            return Err(cycle_error(nodes, &current));
        }

        for &index in &current {
            nodes[index].height = height;
            for &link in &nodes[index].target_links {
                let source = links[link].source;
                if !queued[source] {
                    queued[source] = true;
                    next.push(source);
                }
            }
        }

        height += 1;
        current.clear();
        std::mem::swap(&mut current, &mut next);
        for &index in &current {
            queued[index] = false;
        }
    }

    Ok(())
}

fn cycle_error<N>(nodes: &[SankeyNode<N>], frontier: &[usize]) -> StructuralError {
    // lowest index keeps the reported node stable across runs
    let culprit = frontier.iter().copied().min().unwrap_or(0);
    StructuralError::CircularFlow(nodes[culprit].id.clone())
}
