//! 桥接接收端（页面主世界）
//!
//! 只有主世界能看到页面自己的 jQuery 和 Summernote 实例，
//! 所以切换题型和写入编辑器都要经过这里。

use anyhow::{Context, Result};
use tracing::info;

use crate::infrastructure::JsExecutor;

/// 接收端脚本
///
/// 安装守卫 `window.__quizAutofillBridge` 保证同一文档只注册一次监听器
/// （init script 与立即执行可能在同一文档各跑一次）。
pub const BRIDGE_RECEIVER_JS: &str = r#"
(() => {
    if (window.__quizAutofillBridge) return 'already-installed';
    window.__quizAutofillBridge = true;

    const EDITOR_SELECTOR = '.note-editable';
    const hasJQuery = () => typeof window.$ !== 'undefined';

    const flash = (el, color, ms) => {
        el.style.border = `5px solid ${color}`;
        setTimeout(() => { el.style.border = ''; }, ms);
    };

    const scan = () => {
        const editors = document.querySelectorAll(EDITOR_SELECTOR);
        console.log(`quiz-autofill: scan found ${editors.length} editors`);
        editors.forEach(el => flash(el, 'orange', 1000));
    };

    const changeType = (value) => {
        if (!hasJQuery()) {
            console.warn('quiz-autofill: jQuery missing, change-type skipped');
            return;
        }
        const select = window.$('select#Type, select[name="Type"]');
        if (select.length === 0) return;
        // 值相同时不触发 change，避免页面重建依赖的编辑器
        if (select.val() != value) {
            select.val(value).trigger('change');
        }
    };

    const inject = (index, content) => {
        const editors = document.querySelectorAll(EDITOR_SELECTOR);
        if (index >= editors.length) {
            console.warn(`quiz-autofill: editor #${index} not found, only ${editors.length}`);
            return;
        }
        const target = editors[index];
        flash(target, 'blue', 500);
        target.focus();

        // 光标折叠到末尾，insertHTML 才会写进这个编辑器
        try {
            const range = document.createRange();
            range.selectNodeContents(target);
            range.collapse(false);
            const selection = window.getSelection();
            selection.removeAllRanges();
            selection.addRange(range);
        } catch (e) {
            console.warn('quiz-autofill: selection failed', e);
        }

        const inserted = document.execCommand('insertHTML', false, content);
        if (!inserted && target.innerHTML !== content) {
            target.innerHTML = content;
        }

        for (const name of ['input', 'change', 'blur']) {
            target.dispatchEvent(new Event(name, { bubbles: true }));
        }
        if (hasJQuery()) {
            window.$(target).trigger('summernote.change', [target.innerHTML]);
            window.$(target).trigger('keyup');
        }
    };

    window.addEventListener('quiz-autofill-action', (event) => {
        let data = event.detail;
        try {
            if (typeof data === 'string') data = JSON.parse(data);
            if (!data || typeof data !== 'object') return;

            switch (data.action) {
                case 'scan':
                    scan();
                    break;
                case 'change-type':
                    changeType(data.value);
                    break;
                case 'inject':
                    inject(typeof data.index === 'number' ? data.index : 0, data.content || '');
                    break;
                default:
                    console.warn('quiz-autofill: unknown action', data.action);
            }
        } catch (err) {
            console.error('quiz-autofill bridge error:', err);
        }
    });

    return 'installed';
})()
"#;

/// 安装接收端
///
/// 注册为 init script（后续每次刷新自动生效），并在当前文档立即执行一次
pub async fn install_bridge_receiver(executor: &JsExecutor) -> Result<()> {
    executor
        .add_init_script(BRIDGE_RECEIVER_JS)
        .await
        .context("注册桥接脚本失败")?;

    let status = executor
        .eval(BRIDGE_RECEIVER_JS)
        .await
        .context("执行桥接脚本失败")?;
    info!("🔌 桥接接收端: {}", status.as_str().unwrap_or("unknown"));
    Ok(())
}
