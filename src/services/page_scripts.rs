//! 目标页面的 DOM 查找脚本
//!
//! 第三方页面没有稳定接口，所有基于文本 / 属性的匹配都集中在这里。
//! 页面改版时只需要改这个文件。脚本都在隔离世界执行，只读写共享 DOM。

use serde::Serialize;

/// 富文本编辑器（Summernote）的可编辑区域
pub const EDITOR_SELECTOR: &str = ".note-editable";

/// 浮层容器 id，按钮点击结果写在它的 `data-command` 上
pub const OVERLAY_ID: &str = "quiz-autofill-overlay";

/// 按文本点击 "Add Question" / "Add New Question"
pub const CLICK_ADD_QUESTION_JS: &str = r#"
(() => {
    const wanted = ['add question', 'add new question'];
    const target = Array.from(document.querySelectorAll('*')).find(el =>
        el.tagName !== 'SCRIPT' && el.textContent &&
        wanted.includes(el.textContent.trim().toLowerCase())
    );
    if (!target) return false;
    target.click();
    return true;
})()
"#;

/// 题型下拉框的全部选项
pub const TYPE_OPTIONS_JS: &str = r#"
(() => {
    const select = document.querySelector('select#Type, select[name="Type"]');
    if (!select) return [];
    return Array.from(select.options).map(opt => ({ value: opt.value, text: opt.text }));
})()
"#;

/// 当前编辑器数量
pub fn count_editors_script() -> String {
    format!("document.querySelectorAll('{}').length", EDITOR_SELECTOR)
}

/// 收集"正确答案"控件的函数体
///
/// 先找外层 label / div 文本包含 "option is correct" 的单选 / 复选框；
/// 找不到时，取 "Specify up to 6 answers" 标题之后的全部单选框。
/// 标题取文档顺序上最后一个（最深的）包含该文本的元素。
///
/// 注意方向：这里取标题"之后"的单选框，而不是"之前"。页面上标题在答案控件上方；
/// 若按第一个包含该文本的元素（即 `<html>`）计算，会选中页面上所有单选框。
const ANSWER_CONTROLS_FN: &str = r#"
const answerControls = () => {
    const marked = Array.from(document.querySelectorAll('input[type="radio"], input[type="checkbox"]'))
        .filter(el => {
            const wrapper = el.closest('label') || el.closest('div') || el.parentElement;
            return wrapper && wrapper.textContent.includes('option is correct');
        });
    if (marked.length > 0) return marked;

    const headers = Array.from(document.querySelectorAll('body *'))
        .filter(el => el.textContent && el.textContent.includes('Specify up to 6 answers'));
    const header = headers[headers.length - 1];
    if (!header) return [];
    return Array.from(document.querySelectorAll('input[type="radio"]'))
        .filter(el => header.compareDocumentPosition(el) & Node.DOCUMENT_POSITION_FOLLOWING);
};
"#;

/// 正确答案控件数量
pub fn answer_control_count_script() -> String {
    format!("(() => {{ {} return answerControls().length; }})()", ANSWER_CONTROLS_FN)
}

/// 点击第 `index` 个正确答案控件（有外层 label 时点 label）
pub fn click_answer_control_script(index: usize) -> String {
    format!(
        r#"(() => {{ {}
    const target = answerControls()[{}];
    if (!target) return false;
    const label = target.closest('label');
    (label || target).click();
    return true;
}})()"#,
        ANSWER_CONTROLS_FN, index
    )
}

/// 按属性名匹配分值输入框并直接赋值
pub fn set_points_script(points: &str) -> String {
    format!(
        r#"(() => {{
    const input = document.querySelector('input[name*="Point"], input[name*="Value"]');
    if (!input) return false;
    input.value = {};
    return true;
}})()"#,
        js_literal(&points)
    )
}

/// 点击可见的保存按钮
///
/// 点击放到下一个事件循环执行，页面随后的跳转不会打断本次 evaluate
pub const CLICK_SAVE_JS: &str = r#"
(() => {
    const target = Array.from(document.querySelectorAll('button, input[type="submit"], .btn')).find(el => {
        if (el.offsetParent === null) return false;
        const text = el.textContent ? el.textContent.toLowerCase() : '';
        const value = el.value ? String(el.value).toLowerCase() : '';
        return (text.includes('save') && !text.includes('cancel')) || value.includes('save');
    });
    if (!target) return false;
    setTimeout(() => target.click(), 0);
    return true;
})()
"#;

/// 页面加载后的红色边框，表示已接管
pub const MARK_ATTACHED_JS: &str = "document.body && (document.body.style.border = '5px solid red'), true";

// ========== 浮层 ==========

/// 重建浮层容器，并定义写入 `data-command` 的按钮工厂
fn overlay_prelude() -> String {
    format!(
        r#"
    const old = document.getElementById('{id}');
    if (old) old.remove();
    const container = document.createElement('div');
    container.id = '{id}';
    Object.assign(container.style, {{
        position: 'fixed', top: '10px', right: '10px', zIndex: '2147483647',
        display: 'flex', gap: '10px'
    }});
    const button = (label, command, background) => {{
        const btn = document.createElement('button');
        btn.textContent = label;
        Object.assign(btn.style, {{
            padding: '10px 15px', fontSize: '14px', fontWeight: 'bold',
            backgroundColor: background, color: 'white',
            border: '2px solid white', borderRadius: '5px', cursor: 'pointer'
        }});
        btn.onclick = () => {{ container.dataset.command = command; }};
        return btn;
    }};
"#,
        id = OVERLAY_ID
    )
}

/// 运行中浮层：进度文字 + STOP / RESET
pub fn show_running_script(position: usize, total: usize) -> String {
    let text = format!("Processing Q{} / {}", position, total);
    format!(
        r#"(() => {{ {}
    const info = document.createElement('div');
    info.id = 'quiz-autofill-status';
    info.textContent = {};
    Object.assign(info.style, {{
        padding: '10px', backgroundColor: 'black', color: 'white',
        fontWeight: 'bold', borderRadius: '5px'
    }});
    container.appendChild(info);
    container.appendChild(button('STOP / RESET', 'stop', '#dc3545'));
    document.body.appendChild(container);
    return true;
}})()"#,
        overlay_prelude(),
        js_literal(&text)
    )
}

/// 空闲浮层：开始按钮 + 清除数据
pub fn show_idle_script(pending: usize) -> String {
    let label = format!("Start Upload ({} Qs)", pending);
    format!(
        r#"(() => {{ {}
    container.appendChild(button({}, 'start', '#d63384'));
    const clear = button('Clear Data', 'clear', '#6c757d');
    Object.assign(clear.style, {{ padding: '5px', fontSize: '10px', border: '' }});
    container.appendChild(clear);
    document.body.appendChild(container);
    return true;
}})()"#,
        overlay_prelude(),
        js_literal(&label)
    )
}

/// 更新浮层中的状态文字
pub fn set_status_script(text: &str) -> String {
    format!(
        r#"(() => {{
    const info = document.getElementById('quiz-autofill-status');
    if (!info) return false;
    info.textContent = {};
    return true;
}})()"#,
        js_literal(&text)
    )
}

/// 读取并清除用户在浮层上的点击
pub fn take_command_script() -> String {
    format!(
        r#"(() => {{
    const container = document.getElementById('{}');
    if (!container || !container.dataset.command) return '';
    const command = container.dataset.command;
    delete container.dataset.command;
    return command;
}})()"#,
        OVERLAY_ID
    )
}

/// 弹出阻塞提示后刷新页面
///
/// 放进 setTimeout，alert 阻塞的是页面而不是本次 evaluate
pub fn alert_then_reload_script(message: &str) -> String {
    format!(
        "(() => {{ setTimeout(() => {{ alert({}); window.location.reload(); }}, 0); return true; }})()",
        js_literal(&message)
    )
}

/// 任意可序列化值转成 JS 字面量
fn js_literal<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}
