/// One stage of a pipeline: argv plus optional file redirections. A file
/// redirection always wins over the inter-stage pipe on the same side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub args: Vec<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub append: bool,
}

/// An ordered, owned sequence of stages. Never empty: blank lines produce no
/// pipeline at all.
#[derive(Debug, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Command>,
}

#[derive(Debug, PartialEq, Eq)]
enum Item {
    Word(String),
    Input(String),
    Output { path: String, append: bool },
}

impl Command {
    fn from_items(items: Vec<Item>) -> Result<Command, &'static str> {
        let mut cmd = Command {
            args: Vec::new(),
            input: None,
            output: None,
            append: false,
        };
        let mut redirected = false;

        for item in items {
            match item {
                Item::Word(word) => cmd.args.push(word),
                Item::Input(path) => {
                    cmd.input = Some(path);
                    redirected = true;
                }
                Item::Output { path, append } => {
                    cmd.output = Some(path);
                    cmd.append = append;
                    redirected = true;
                }
            }
        }

        if cmd.args.is_empty() && redirected {
            return Err("command before redirection");
        }
        Ok(cmd)
    }

    /// A segment that dissolved into nothing, e.g. between two adjacent
    /// pipes. The caller drops these.
    pub(crate) fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

peg::parser! {
    pub grammar parser() for str {
        pub rule pipeline() -> Vec<Command>
        = stages:(stage() ** "|") ![_] { stages }

        rule stage() -> Command
        = ws()* items:(item() ** (ws()+)) ws()*
        {? Command::from_items(items) }

        rule item() -> Item
        = "<" op_end() ws()* t:token() { Item::Input(t) }
        / ">>" op_end() ws()* t:token() { Item::Output { path: t, append: true } }
        / ">" op_end() ws()* t:token() { Item::Output { path: t, append: false } }
        / !redirect_op() t:token() { Item::Word(t) }

        // operators count only as whole tokens: "<x", "a>b" and ">>>" are
        // ordinary arguments
        rule redirect_op() = ("<" / ">>" / ">") op_end()
        rule op_end() = &ws() / &"|" / ![_]

        rule token() -> String
        = t:$([^ ' ' | '\t' | '|']+) { t.to_string() }

        rule ws() = [' ' | '\t']
    }
}
