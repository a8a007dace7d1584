//! User-facing texts and keyboards.

use tutorbot_models::{
    ChatId, InlineButton, Keyboard, OutgoingMessage, Profile, Role, Subject,
};

pub const BUTTON_SHARE_CONTACT: &str = "Поделиться контактом";
pub const BUTTON_ACCOUNT: &str = "Аккаунт";
pub const BUTTON_ASK: &str = "Оставить запрос";
pub const BUTTON_ISSUE_CODE: &str = "Создать уникальный код";
pub const BUTTON_REREGISTER: &str = "Перерегистрация";
pub const BUTTON_CANCEL: &str = "Отмена";

pub const WELCOME: &str = "Привет! Для начала работы поделись своим контактом.";
pub const NOT_REGISTERED: &str = "Вы не зарегистрированы в системе. Давайте зарегистрируем вас!";
pub const ROLE_PROMPT: &str = "Выберите вашу роль:";
pub const GRADE_PROMPT: &str = "Введите ваш класс:";
pub const GRADE_INVALID: &str = "Класс нужно указать числом от 1 до 11. Попробуйте ещё раз:";
pub const SUBJECT_PROMPT: &str = "Выберите ваш предмет:";
pub const SUBJECT_INVALID: &str = "Такого предмета нет. Выберите предмет кнопкой ниже:";
pub const CONTACT_INVALID: &str = "Не удалось прочитать контакт. Поделитесь контактом ещё раз.";
pub const TEACHER_CODE_PROMPT: &str =
    "Введите код, полученный от учителя (или «Отмена», чтобы выбрать роль заново):";
pub const CODE_NOT_FOUND: &str = "Код не найден. Проверьте его и попробуйте ещё раз:";
pub const CODE_ALREADY_USED: &str = "Этот код уже был использован. Попросите у учителя новый:";
pub const REGISTRATION_DONE: &str = "Регистрация завершена!";
pub const REGISTRATION_FAILED: &str =
    "Не удалось завершить регистрацию. Начните заново командой /start.";
pub const REGISTRATION_CANCELLED: &str = "Ввод кода отменён.";
pub const REREGISTER_STARTED: &str = "Ваш профиль удалён. Давайте зарегистрируем вас заново!";
pub const PROFILE_NOT_FOUND: &str = "Информация о вас не найдена.";
pub const ISSUE_NOT_TEACHER: &str = "Создавать коды могут только учителя.";
pub const ISSUE_FAILED: &str = "Не удалось создать код. Попробуйте позже.";
pub const QUESTION_PROMPT: &str = "Опишите ваш вопрос одним сообщением:";
pub const QUESTION_EMPTY: &str = "Сообщение пустое. Опишите ваш вопрос текстом:";
pub const TICKET_SENT: &str = "Ваш запрос отправлен. Ответ придёт в этот чат.";
pub const TICKETS_UNAVAILABLE: &str = "Сейчас запросы не принимаются. Попробуйте позже.";
pub const REPLY_DELIVERED: &str = "Ответ отправлен пользователю.";
pub const CANCELLED: &str = "Действие отменено.";
pub const STORAGE_FAILED: &str = "Что-то пошло не так. Попробуйте позже.";
pub const HELP: &str = "Доступные команды:\n\
/start — начать работу\n\
/menu — показать меню\n\
/code — создать код для помощника (для учителей)\n\
/reregister — пройти регистрацию заново\n\
/cancel — отменить текущее действие";

pub fn code_subject_mismatch(actual: Subject) -> String {
    format!(
        "Этот код выдан по предмету «{}». Проверьте выбранный предмет или попросите другой код:",
        actual.display_name()
    )
}

pub fn code_issued(code: &str, subject: Subject) -> String {
    format!(
        "Ваш уникальный код: {code}\nПредмет: {}\nПередайте его помощнику учителя.",
        subject.display_name()
    )
}

pub fn code_activated(code: &str) -> String {
    format!("Код {code} активирован.")
}

pub fn admin_reply(text: &str) -> String {
    format!("Ответ на ваш запрос:\n\n{text}")
}

pub fn profile_card(profile: &Profile) -> String {
    let d = profile.details();
    let mut card = format!(
        "Роль: {}\nИмя: {} {}\nТелефон: {}",
        profile.role().display_name(),
        d.first_name,
        d.last_name,
        d.phone_number
    );
    if let Some(grade) = profile.grade() {
        card.push_str(&format!("\nКласс: {grade}"));
    }
    if let Some(subject) = profile.subject() {
        card.push_str(&format!("\nПредмет: {}", subject.display_name()));
    }
    card.trim_end().to_string()
}

pub fn contact_request(chat_id: ChatId) -> OutgoingMessage {
    OutgoingMessage::with_keyboard(
        chat_id,
        WELCOME,
        Keyboard::ShareContact {
            label: BUTTON_SHARE_CONTACT.to_string(),
        },
    )
}

pub fn role_prompt(chat_id: ChatId) -> OutgoingMessage {
    let rows = [
        (Role::Student, "Я ученик"),
        (Role::CoTeacher, "Я помощник учителя"),
        (Role::Teacher, "Я учитель"),
    ]
    .into_iter()
    .map(|(role, label)| vec![InlineButton::new(label, role.callback_data())])
    .collect();

    OutgoingMessage::with_keyboard(chat_id, ROLE_PROMPT, Keyboard::Inline { rows })
}

pub fn subject_keyboard() -> Keyboard {
    let rows = Subject::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|s| InlineButton::new(s.display_name(), s.callback_data()))
                .collect()
        })
        .collect();
    Keyboard::Inline { rows }
}

pub fn subject_prompt(chat_id: ChatId, text: &str) -> OutgoingMessage {
    OutgoingMessage::with_keyboard(chat_id, text, subject_keyboard())
}

pub fn cancel_keyboard() -> Keyboard {
    Keyboard::Menu {
        rows: vec![vec![BUTTON_CANCEL.to_string()]],
    }
}

pub fn menu_title(role: Role) -> &'static str {
    match role {
        Role::Student => "Меню ученика:",
        Role::CoTeacher => "Меню помощника учителя:",
        Role::Teacher => "Меню учителя:",
    }
}

pub fn menu_keyboard(role: Role) -> Keyboard {
    let mut rows = vec![vec![BUTTON_ACCOUNT.to_string()]];
    if role == Role::Teacher {
        rows.push(vec![BUTTON_ISSUE_CODE.to_string()]);
    }
    rows.push(vec![BUTTON_ASK.to_string()]);
    rows.push(vec![BUTTON_REREGISTER.to_string()]);
    Keyboard::Menu { rows }
}

pub fn menu(chat_id: ChatId, role: Role) -> OutgoingMessage {
    OutgoingMessage::with_keyboard(chat_id, menu_title(role), menu_keyboard(role))
}
