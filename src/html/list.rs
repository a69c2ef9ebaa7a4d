use crate::model::{ListInfo, ListKind};

struct OpenList {
    kind: ListKind,
    level: u8,
    item_open: bool,
}

impl OpenList {
    fn tag(&self) -> &'static str {
        match self.kind {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Lists currently open in one container, innermost last. A deeper level
/// opens inside the current `<li>`; a shallower one closes back down to it.
#[derive(Default)]
pub(super) struct ListStack {
    open: Vec<OpenList>,
}

impl ListStack {
    pub(super) fn push_item(&mut self, info: &ListInfo, content: &str, out: &mut String) {
        while self.open.last().is_some_and(|top| top.level > info.level) {
            self.pop(out);
        }

        let continues = self
            .open
            .last()
            .is_some_and(|top| top.level == info.level && top.kind == info.kind);
        if continues {
            if let Some(top) = self.open.last_mut()
                && top.item_open
            {
                out.push_str("</li>\n");
                top.item_open = false;
            }
        } else {
            if self.open.last().is_some_and(|top| top.level == info.level) {
                self.pop(out);
            }
            let list = OpenList {
                kind: info.kind,
                level: info.level,
                item_open: false,
            };
            out.push('<');
            out.push_str(list.tag());
            out.push_str(">\n");
            self.open.push(list);
        }

        out.push_str("<li>");
        out.push_str(content);
        if let Some(top) = self.open.last_mut() {
            top.item_open = true;
        }
    }

    fn pop(&mut self, out: &mut String) {
        if let Some(list) = self.open.pop() {
            if list.item_open {
                out.push_str("</li>\n");
            }
            out.push_str("</");
            out.push_str(list.tag());
            out.push_str(">\n");
        }
    }

    pub(super) fn close_all(&mut self, out: &mut String) {
        while !self.open.is_empty() {
            self.pop(out);
        }
    }
}
