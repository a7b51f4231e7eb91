//! Type names for diagnostics and error messages.

use crate::data::TypeData;
use crate::Idx;

use super::TypePool;

impl TypePool {
    /// Format a type as a human-readable name, e.g. `Dictionary<int,Node>`.
    pub fn display(&self, idx: Idx) -> String {
        let mut buf = String::new();
        self.display_into(idx, &mut buf);
        buf
    }

    /// Format a type into an existing buffer.
    pub fn display_into(&self, idx: Idx, buf: &mut String) {
        if let Some(name) = idx.builtin_name() {
            buf.push_str(name);
            return;
        }
        let Some(entry) = self.get(idx) else {
            buf.push_str("<unknown>");
            return;
        };
        match &entry.data {
            TypeData::Nullable(inner) => {
                self.display_into(*inner, buf);
                buf.push('?');
            }
            TypeData::Array { elem, rank } => {
                self.display_into(*elem, buf);
                buf.push('[');
                for _ in 1..*rank {
                    buf.push(',');
                }
                buf.push(']');
            }
            TypeData::List(elem) => self.display_generic("List", &[*elem], buf),
            TypeData::Set(elem) => self.display_generic("HashSet", &[*elem], buf),
            TypeData::Map { key, value } => self.display_generic("Dictionary", &[*key, *value], buf),
            TypeData::Tuple(elems) => self.display_generic("Tuple", elems, buf),
            data => match data.nominal_name() {
                Some(name) => buf.push_str(name),
                None => buf.push_str("<unknown>"),
            },
        }
    }

    fn display_generic(&self, head: &str, args: &[Idx], buf: &mut String) {
        buf.push_str(head);
        buf.push('<');
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                buf.push(',');
            }
            self.display_into(arg, buf);
        }
        buf.push('>');
    }
}
