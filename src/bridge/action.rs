use serde::{Deserialize, Serialize};

/// 派发给页面主世界的桥接动作
///
/// 序列化后形如 `{"action": "inject", "index": 1, "content": "..."}`。
/// 没有确认、没有重试，只保证同一发送方的先后顺序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum BridgeAction {
    /// 统计当前可见的富文本编辑器（只用于日志和高亮）
    Scan,
    /// 通过页面自己的 jQuery 切换题目类型下拉框
    ChangeType { value: String },
    /// 向第 `index` 个编辑器插入 HTML 片段
    Inject { index: usize, content: String },
}

impl BridgeAction {
    pub fn change_type(value: impl Into<String>) -> Self {
        Self::ChangeType {
            value: value.into(),
        }
    }

    pub fn inject(index: usize, content: impl Into<String>) -> Self {
        Self::Inject {
            index,
            content: content.into(),
        }
    }

    /// 动作名称（与页面脚本中的分支一致）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::ChangeType { .. } => "change-type",
            Self::Inject { .. } => "inject",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_matches_receiver() {
        assert_eq!(serde_json::to_value(BridgeAction::Scan).unwrap(), json!({"action": "scan"}));
        assert_eq!(
            serde_json::to_value(BridgeAction::change_type("3")).unwrap(),
            json!({"action": "change-type", "value": "3"})
        );
        assert_eq!(
            serde_json::to_value(BridgeAction::inject(2, "<b>x</b>")).unwrap(),
            json!({"action": "inject", "index": 2, "content": "<b>x</b>"})
        );
    }

    #[test]
    fn test_name_matches_tag() {
        for action in [BridgeAction::Scan, BridgeAction::change_type("1"), BridgeAction::inject(0, "")] {
            let value = serde_json::to_value(&action).unwrap();
            assert_eq!(value["action"], action.name());
        }
    }
}
