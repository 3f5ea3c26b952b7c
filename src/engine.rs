//! The matching engine: priority-ordered pattern matching over a mutable
//! span list.
//!
//! One tokenize pass works like this:
//! 1. Seed a span list with the whole input as a single plain-text span.
//! 2. For each grammar entry, in declaration order, scan the live spans and
//!    splice every match out as a finished token. Earlier entries win on
//!    overlap simply because the spans they consume are gone by the time a
//!    later entry scans.
//! 3. Greedy rules match against the full input from the current offset, so
//!    one match may swallow a run of spans, including tokens produced by
//!    earlier entries. When that happens the invalidated region is
//!    re-scanned, bounded by the furthest offset the match touched and
//!    guarded so the causing rule cannot re-trigger itself.
//! 4. Flatten the list into the resulting token stream.
//!
//! Plain single-pass regex scanning cannot re-prioritize spans that are
//! already tokenized; the span list plus bounded rematch re-scans exactly
//! the invalidated region instead of restarting the whole pass.

use crate::grammar::{GrammarId, GrammarSet, Rule};
use crate::span_list::{NodeId, SpanList};
use crate::token::{Item, Token, TokenContent, TokenStream};

/// Tokenize `text` against the grammar registered under `grammar`.
///
/// Never fails: if the runaway-match guard trips, whatever stream exists at
/// that point is returned. Splices conserve the input text, so even a
/// partial stream flattens back to the full input.
pub(crate) fn tokenize(set: &GrammarSet, text: &str, grammar: GrammarId) -> TokenStream {
    let entries = set.resolved_entries(grammar);
    let mut list = SpanList::new(text);
    let head = list.head();
    match_grammar(set, &entries, text, &mut list, head, 0, None);
    list.into_stream()
}

/// Context for one bounded re-scan of a region invalidated by a greedy
/// match. `cause` identifies the (entry, rule) that triggered it; `reach`
/// is the furthest input offset the re-scan is responsible for.
struct Rematch {
    cause: (usize, usize),
    reach: usize,
}

#[derive(PartialEq)]
enum Flow {
    Completed,
    Aborted,
}

fn match_grammar(
    set: &GrammarSet,
    entries: &[(String, Vec<Rule>)],
    text: &str,
    list: &mut SpanList,
    start_node: NodeId,
    start_pos: usize,
    mut rematch: Option<&mut Rematch>,
) -> Flow {
    for (entry_index, (kind, rules)) in entries.iter().enumerate() {
        for (rule_index, rule) in rules.iter().enumerate() {
            if let Some(ctx) = rematch.as_deref() {
                if ctx.cause == (entry_index, rule_index) {
                    // The causing rule must not re-consume its own fresh
                    // region; entries after it will scan the region in the
                    // outer pass anyway.
                    return Flow::Completed;
                }
            }

            let mut current = list.next(start_node);
            let mut pos = start_pos;

            'spans: while current != list.tail() {
                if let Some(ctx) = rematch.as_deref() {
                    if pos >= ctx.reach {
                        break;
                    }
                }
                if list.live_len() > text.len() {
                    // Runaway guard: a degenerate pattern is splitting the
                    // input faster than it can consume it. Give up on the
                    // whole pass and let the caller keep the partial result.
                    return Flow::Aborted;
                }

                let node_len = list.value_len(current);
                if matches!(list.value(current), Some(Item::Token(_))) {
                    pos += node_len;
                    current = list.next(current);
                    continue;
                }

                // Candidate segment [seg_start, seg_end) of the input and
                // match range [from, to) within it.
                let seg_start;
                let seg_end;
                let from;
                let to;
                let mut remove_count = 1;

                if rule.is_greedy() {
                    let Some((match_from, match_to)) =
                        rule.pattern().match_at(text, pos, rule.is_lookbehind())
                    else {
                        break;
                    };
                    if match_from >= text.len() {
                        break;
                    }

                    // Find the span containing the match start.
                    let mut covered = pos + node_len;
                    while match_from >= covered {
                        current = list.next(current);
                        covered += list.value_len(current);
                    }
                    covered -= list.value_len(current);
                    pos = covered;

                    if matches!(list.value(current), Some(Item::Token(_))) {
                        // A match cannot start inside an existing token.
                        pos += list.value_len(current);
                        current = list.next(current);
                        continue 'spans;
                    }

                    // Count the spans the match covers. A text span sitting
                    // right at the match end is folded in too, so the
                    // leftover after-text merges with it instead of leaving
                    // two adjacent text spans.
                    let mut node = current;
                    let mut end = covered;
                    loop {
                        if node == list.tail() {
                            break;
                        }
                        let is_text = matches!(list.value(node), Some(Item::Text(_)));
                        if end >= match_to && !is_text {
                            break;
                        }
                        remove_count += 1;
                        end += list.value_len(node);
                        node = list.next(node);
                    }
                    remove_count -= 1;

                    seg_start = pos;
                    seg_end = end;
                    from = match_from;
                    to = match_to;
                } else {
                    let segment = &text[pos..pos + node_len];
                    let Some((match_from, match_to)) =
                        rule.pattern().match_at(segment, 0, rule.is_lookbehind())
                    else {
                        pos += node_len;
                        current = list.next(current);
                        continue 'spans;
                    };
                    seg_start = pos;
                    seg_end = pos + node_len;
                    from = pos + match_from;
                    to = pos + match_to;
                }

                let before = &text[seg_start..from];
                let matched = &text[from..to];
                let after = &text[to..seg_end];

                let reach = seg_end;
                if let Some(ctx) = rematch.as_deref_mut() {
                    if reach > ctx.reach {
                        ctx.reach = reach;
                    }
                }

                let mut anchor = list.prev(current);
                let mut token_start = seg_start;
                if !before.is_empty() {
                    anchor = list.insert_after(anchor, Item::Text(before.to_string()));
                    token_start += before.len();
                }
                list.remove_after(anchor, remove_count);

                let content = match rule.inside_grammar() {
                    Some(inner) => TokenContent::Stream(tokenize(set, matched, inner)),
                    None => TokenContent::Text(matched.to_string()),
                };
                let token = Token::new(
                    kind.clone(),
                    content,
                    rule.aliases().to_vec(),
                    matched.len(),
                );
                current = list.insert_after(anchor, Item::Token(token));
                if !after.is_empty() {
                    list.insert_after(current, Item::Text(after.to_string()));
                }

                if remove_count > 1 {
                    // The match swallowed previously produced spans; re-run
                    // earlier entries over the invalidated region.
                    let mut nested = Rematch {
                        cause: (entry_index, rule_index),
                        reach,
                    };
                    let flow = match_grammar(
                        set,
                        entries,
                        text,
                        list,
                        list.prev(current),
                        token_start,
                        Some(&mut nested),
                    );
                    if flow == Flow::Aborted {
                        return Flow::Aborted;
                    }
                    if let Some(ctx) = rematch.as_deref_mut() {
                        if nested.reach > ctx.reach {
                            ctx.reach = nested.reach;
                        }
                    }
                }

                pos = token_start + matched.len();
                current = list.next(current);
            }
        }
    }
    Flow::Completed
}
