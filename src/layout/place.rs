use std::mem;

use super::{Align, Extent, LayoutOptions, SankeyLink, SankeyNode};

/// Assigns pixel geometry to layered nodes, then derives ribbon widths and
/// band positions for the links. Returns the column count.
pub(super) fn position<N, L>(
    nodes: &mut [SankeyNode<N>],
    links: &mut [SankeyLink<L>],
    options: &LayoutOptions<N, L>,
    extent: Extent,
) -> usize {
    let column_count = nodes
        .iter()
        .map(|node| node.depth)
        .max()
        .map_or(0, |depth| depth + 1);
    if column_count == 0 {
        return 0;
    }

    let columns = spread_horizontal(nodes, links, options, extent, column_count);
    stack_vertical(&columns, nodes, links, options, extent);
    order_links(nodes, links, options);
    link_breadths(nodes, links);
    column_count
}

fn spread_horizontal<N, L>(
    nodes: &mut [SankeyNode<N>],
    links: &[SankeyLink<L>],
    options: &LayoutOptions<N, L>,
    extent: Extent,
    column_count: usize,
) -> Vec<Vec<usize>> {
    let spacing = if column_count > 1 {
        (extent.x1 - extent.x0 - options.node_width) / (column_count - 1) as f64
    } else {
        0.0
    };

    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); column_count];
    for index in 0..nodes.len() {
        let column = column_for(options.align, nodes, links, index, column_count);
        let x0 = extent.x0 + column as f64 * spacing;
        nodes[index].x0 = x0;
        nodes[index].x1 = x0 + options.node_width;
        columns[column].push(index);
    }

    if let Some(node_sort) = options.node_sort {
        for column in &mut columns {
            // sort_by is stable, so ties keep input order
            column.sort_by(|&a, &b| node_sort(&nodes[a], &nodes[b]));
        }
    }

    columns
}

fn column_for<N, L>(
    align: Align,
    nodes: &[SankeyNode<N>],
    links: &[SankeyLink<L>],
    index: usize,
    column_count: usize,
) -> usize {
    let node = &nodes[index];
    let column = match align {
        Align::Left => node.depth,
        Align::Right => column_count - 1 - node.height,
        Align::Justify => {
            if node.source_links.is_empty() {
                column_count - 1
            } else {
                node.depth
            }
        }
        Align::Center => {
            if !node.target_links.is_empty() {
                node.depth
            } else if let Some(nearest) = node
                .source_links
                .iter()
                .map(|&link| nodes[links[link].target].depth)
                .min()
            {
                nearest.saturating_sub(1)
            } else {
                0
            }
        }
    };
    column.min(column_count - 1)
}

fn stack_vertical<N, L>(
    columns: &[Vec<usize>],
    nodes: &mut [SankeyNode<N>],
    links: &mut [SankeyLink<L>],
    options: &LayoutOptions<N, L>,
    extent: Extent,
) {
    let drawable = extent.y1 - extent.y0;
    let widest = columns.iter().map(Vec::len).max().unwrap_or(0);
    // Cap the padding so the fullest column can fit its gaps even before any
    // node gets height.
    let padding = if widest > 1 {
        options
            .node_padding
            .max(0.0)
            .min(drawable / (widest - 1) as f64)
    } else {
        options.node_padding.max(0.0)
    };

    // One scale for the whole diagram: per-column scales would break the
    // equality between a node's height and the widths of its ribbons on the
    // other end.
    let mut scale = f64::INFINITY;
    for column in columns {
        let total: f64 = column.iter().map(|&index| nodes[index].value).sum();
        if total > 0.0 {
            let slack = drawable - (column.len() - 1) as f64 * padding;
            scale = scale.min(slack / total);
        }
    }
    if !scale.is_finite() {
        scale = 0.0;
    }

    for column in columns {
        let mut y = extent.y0;
        for &index in column {
            let height = nodes[index].value * scale;
            nodes[index].y0 = y;
            nodes[index].y1 = y + height;
            y = nodes[index].y1 + padding;
            for &link in &nodes[index].source_links {
                links[link].width = links[link].value * scale;
            }
        }

        // spread the leftover evenly above, between and below the stack
        let gap = (extent.y1 - y + padding) / (column.len() + 1) as f64;
        for (position, &index) in column.iter().enumerate() {
            let shift = gap * (position + 1) as f64;
            nodes[index].y0 += shift;
            nodes[index].y1 += shift;
        }
    }
}

fn order_links<N, L>(
    nodes: &mut [SankeyNode<N>],
    links: &[SankeyLink<L>],
    options: &LayoutOptions<N, L>,
) {
    for index in 0..nodes.len() {
        let mut source_links = mem::take(&mut nodes[index].source_links);
        let mut target_links = mem::take(&mut nodes[index].target_links);

        if let Some(link_sort) = options.link_sort {
            source_links.sort_by(|&a, &b| link_sort(&links[a], &links[b]).then(a.cmp(&b)));
            target_links.sort_by(|&a, &b| link_sort(&links[a], &links[b]).then(a.cmp(&b)));
        } else {
            // ribbons fan out toward where their far end sits, which keeps
            // crossings near the node to a minimum
            source_links.sort_by(|&a, &b| {
                nodes[links[a].target]
                    .y0
                    .total_cmp(&nodes[links[b].target].y0)
                    .then(a.cmp(&b))
            });
            target_links.sort_by(|&a, &b| {
                nodes[links[a].source]
                    .y0
                    .total_cmp(&nodes[links[b].source].y0)
                    .then(a.cmp(&b))
            });
        }

        nodes[index].source_links = source_links;
        nodes[index].target_links = target_links;
    }
}

fn link_breadths<N, L>(nodes: &[SankeyNode<N>], links: &mut [SankeyLink<L>]) {
    for node in nodes {
        let mut edge = node.y0;
        for &link in &node.source_links {
            links[link].y0 = edge + links[link].width / 2.0;
            edge += links[link].width;
        }

        let mut edge = node.y0;
        for &link in &node.target_links {
            links[link].y1 = edge + links[link].width / 2.0;
            edge += links[link].width;
        }
    }
}
