//! Splitting vendor turns into groups, and finding them again.
//!
//! A vendor message holding several independent things (narrative plus tool
//! calls, or several tool results) decodes into several internal messages.
//! [`Turn`] builds that list on the decode side; [`plan_units`] recovers the
//! fusion units on the encode side.

use serdes_wire_core::{
    CodecOptions, ContentPart, FunctionCall, GroupInfo, InternalMessage, OriginalInfo, Role,
};
use tracing::debug;

/// One run of a decoded vendor message: adjacent content parts, or a tool
/// invocation or result.
enum Piece {
    Narrative(Vec<ContentPart>),
    Item(InternalMessage),
}

/// The pieces of one decoded vendor message, before grouping.
///
/// Pieces keep the order of the vendor's parts. Content parts on either side
/// of a tool call become separate narrative members, so group positions
/// replay the vendor order on encode.
pub(crate) struct Turn {
    provider: &'static str,
    role: Role,
    pieces: Vec<Piece>,
    name: Option<String>,
    function_call: Option<FunctionCall>,
    tool_call_id: Option<String>,
    original: Option<OriginalInfo>,
}

impl Turn {
    pub(crate) fn new(provider: &'static str, role: Role) -> Self {
        Self {
            provider,
            role,
            pieces: Vec::new(),
            name: None,
            function_call: None,
            tool_call_id: None,
            original: None,
        }
    }

    pub(crate) fn push_content(&mut self, part: ContentPart) {
        match self.pieces.last_mut() {
            Some(Piece::Narrative(parts)) => parts.push(part),
            _ => self.pieces.push(Piece::Narrative(vec![part])),
        }
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// A legacy single function call that stays on the narrative message.
    pub(crate) fn set_function_call(&mut self, call: FunctionCall) {
        self.function_call = Some(call);
    }

    /// Correlation id when the vendor message is itself a tool result.
    pub(crate) fn set_tool_call_id(&mut self, id: Option<String>) {
        self.tool_call_id = id;
    }

    fn original_mut(&mut self) -> &mut OriginalInfo {
        let provider = self.provider;
        self.original.get_or_insert_with(|| OriginalInfo::new(provider))
    }

    /// Record a codec flag on the first decoded message.
    pub(crate) fn preserve(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.original_mut().fields.insert(key.into(), value);
    }

    /// Record an unrecognized vendor field on the first decoded message.
    pub(crate) fn preserve_unknown(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.original_mut().unknown.insert(key.into(), value);
    }

    /// Add a tool invocation as its own message.
    pub(crate) fn push_invocation(&mut self, message: InternalMessage) {
        self.pieces.push(Piece::Item(message));
    }

    /// Add a tool result as its own message.
    pub(crate) fn push_result(&mut self, message: InternalMessage) {
        self.pieces.push(Piece::Item(message));
    }

    /// Check if the whole narrative is exactly one text part.
    pub(crate) fn single_text_narrative(&self) -> bool {
        let mut parts = self.pieces.iter().flat_map(|piece| match piece {
            Piece::Narrative(parts) => parts.as_slice(),
            Piece::Item(_) => &[][..],
        });
        matches!((parts.next(), parts.next()), (Some(ContentPart::Text { .. }), None))
    }

    /// Produce the internal messages in vendor order, grouping them when
    /// there is more than one and they are not all tool results.
    pub(crate) fn finish(self, options: &CodecOptions) -> Vec<InternalMessage> {
        let role = self.role;
        let mut head = Some((self.name, self.function_call, self.tool_call_id));
        let mut messages = Vec::with_capacity(self.pieces.len() + 1);

        for piece in self.pieces {
            match piece {
                Piece::Narrative(parts) => {
                    let mut message = InternalMessage::new(role, parts);
                    if let Some((name, function_call, tool_call_id)) = head.take() {
                        message.name = name;
                        message.function_call = function_call;
                        message.tool_call_id = tool_call_id;
                    }
                    messages.push(message);
                }
                Piece::Item(message) => messages.push(message),
            }
        }

        // No content parts: the narrative message still exists when it
        // carries a legacy call or when there is nothing else.
        if let Some((name, function_call, tool_call_id)) = head {
            if function_call.is_some() || messages.is_empty() {
                messages.insert(
                    0,
                    InternalMessage {
                        name,
                        function_call,
                        tool_call_id,
                        ..InternalMessage::new(role, Vec::new())
                    },
                );
            }
        }

        if let Some(original) = self.original {
            let first = messages.remove(0);
            messages.insert(0, merge_original(first, original));
        }

        let all_results = messages.iter().all(InternalMessage::is_tool_result);
        if messages.len() < 2 || all_results {
            return messages;
        }

        let id = options.next_id();
        let total = messages.len();
        debug!(
            target: "serdes_wire::decode",
            provider = self.provider,
            group = %id,
            total,
            "Split vendor message into group"
        );
        messages
            .into_iter()
            .enumerate()
            .map(|(position, message)| message.with_group(GroupInfo::new(id.clone(), position, total)))
            .collect()
    }
}

fn merge_original(message: InternalMessage, original: OriginalInfo) -> InternalMessage {
    match message.original().cloned() {
        Some(mut existing) => {
            for (key, value) in original.fields {
                existing.fields.entry(key).or_insert(value);
            }
            for (key, value) in original.unknown {
                existing.unknown.entry(key).or_insert(value);
            }
            message.with_original(existing)
        }
        None => message.with_original(original),
    }
}

/// One fusion unit found while scanning internal messages for encoding.
#[derive(Debug)]
pub(crate) enum Unit<'a> {
    /// Members of one group, sorted by position.
    Group(Vec<(usize, &'a InternalMessage)>),
    /// A run of consecutive ungrouped function-role messages.
    Results(Vec<(usize, &'a InternalMessage)>),
    /// Any other message.
    Single(usize, &'a InternalMessage),
}

#[cfg(test)]
impl Unit<'_> {
    /// Input indices covered by this unit.
    pub(crate) fn indices(&self) -> Vec<usize> {
        match self {
            Unit::Group(members) | Unit::Results(members) => {
                members.iter().map(|(i, _)| *i).collect()
            }
            Unit::Single(i, _) => vec![*i],
        }
    }
}

/// What a group member becomes in the fused vendor message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemberKind {
    /// Content, possibly with a call attached.
    Narrative,
    /// A bare tool invocation.
    Invocation,
    /// A tool result.
    Result,
}

impl MemberKind {
    pub(crate) fn of(message: &InternalMessage) -> Self {
        if message.is_tool_result() {
            Self::Result
        } else if message.is_tool_invocation() && message.content.is_empty() {
            Self::Invocation
        } else {
            Self::Narrative
        }
    }
}

/// Members of a group, split by what they become in the fused message.
#[derive(Default)]
pub(crate) struct Members<'a> {
    /// Narrative messages.
    pub narrative: Vec<(usize, &'a InternalMessage)>,
    /// Tool invocations.
    pub invocations: Vec<(usize, &'a InternalMessage)>,
    /// Tool results.
    pub results: Vec<(usize, &'a InternalMessage)>,
}

impl<'a> Members<'a> {
    pub(crate) fn partition(members: &[(usize, &'a InternalMessage)]) -> Self {
        let mut split = Self::default();
        for &(index, message) in members {
            match MemberKind::of(message) {
                MemberKind::Result => split.results.push((index, message)),
                MemberKind::Invocation => split.invocations.push((index, message)),
                MemberKind::Narrative => split.narrative.push((index, message)),
            }
        }
        split
    }

    /// Role of the fused vendor message.
    pub(crate) fn role(&self) -> Role {
        match self.narrative.first() {
            Some((_, message)) => message.role,
            None if !self.invocations.is_empty() => Role::Assistant,
            None => Role::User,
        }
    }

    /// The message whose provenance describes the fused vendor message.
    pub(crate) fn lead(&self) -> Option<&'a InternalMessage> {
        [&self.narrative, &self.invocations, &self.results]
            .into_iter()
            .flat_map(|members| members.iter())
            .min_by_key(|(_, m)| m.group().map_or(0, |g| g.position))
            .map(|(_, m)| *m)
    }
}

/// Scan left to right and split the input into fusion units.
///
/// Group members need not be contiguous: every later message sharing the
/// group id joins the unit, and members are re-sorted by position.
pub(crate) fn plan_units(messages: &[InternalMessage]) -> Vec<Unit<'_>> {
    let mut consumed = vec![false; messages.len()];
    let mut units = Vec::new();
    let mut cursor = 0;

    while cursor < messages.len() {
        if consumed[cursor] {
            cursor += 1;
            continue;
        }
        let message = &messages[cursor];

        if let Some(group) = message.group() {
            let mut members: Vec<(usize, &InternalMessage)> = Vec::new();
            for (index, candidate) in messages.iter().enumerate().skip(cursor) {
                if consumed[index] {
                    continue;
                }
                if candidate.group().map(|g| g.id.as_str()) == Some(group.id.as_str()) {
                    consumed[index] = true;
                    members.push((index, candidate));
                }
            }
            members.sort_by_key(|(_, m)| m.group().map_or(0, |g| g.position));
            units.push(Unit::Group(members));
        } else if message.is_tool_result() {
            let mut members = Vec::new();
            while cursor < messages.len()
                && !consumed[cursor]
                && messages[cursor].is_tool_result()
                && messages[cursor].group().is_none()
            {
                consumed[cursor] = true;
                members.push((cursor, &messages[cursor]));
                cursor += 1;
            }
            units.push(Unit::Results(members));
            continue;
        } else {
            consumed[cursor] = true;
            units.push(Unit::Single(cursor, message));
        }
        cursor += 1;
    }

    units
}
