/// A button press, decoded from its callback data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SelectCategory(String),
    ToggleSource(String),
    Done,
    Schedule,
    Unsubscribe,
    StartAgain,
    Customize,
}

const CATEGORY_PREFIX: &str = "cat_";
const SOURCE_PREFIX: &str = "src_";

impl Action {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(cat) = data.strip_prefix(CATEGORY_PREFIX) {
            return (!cat.is_empty()).then(|| Action::SelectCategory(cat.to_string()));
        }
        if let Some(src) = data.strip_prefix(SOURCE_PREFIX) {
            return (!src.is_empty()).then(|| Action::ToggleSource(src.to_string()));
        }
        match data {
            "done" => Some(Action::Done),
            "schedule" => Some(Action::Schedule),
            "unsubscribe" => Some(Action::Unsubscribe),
            "start_again" => Some(Action::StartAgain),
            "customize" => Some(Action::Customize),
            _ => None,
        }
    }

    pub fn callback_data(&self) -> String {
        match self {
            Action::SelectCategory(cat) => format!("{CATEGORY_PREFIX}{cat}"),
            Action::ToggleSource(src) => format!("{SOURCE_PREFIX}{src}"),
            Action::Done => "done".to_string(),
            Action::Schedule => "schedule".to_string(),
            Action::Unsubscribe => "unsubscribe".to_string(),
            Action::StartAgain => "start_again".to_string(),
            Action::Customize => "customize".to_string(),
        }
    }
}
