//! Prompt templates and canned responses
//!
//! All user-facing text is Vietnamese. The grounded-answer template binds
//! the model to the supplied context only, demands per-claim citations,
//! and fixes the refusal phrase verbatim.
use crate::corpus::Passage;
use crate::generation::ConversationTurn;

/// Fixed introduction returned to a meta-question with no history
pub const INTRODUCTION: &str = "Tôi là LawBot, một trợ lý AI chuyên về Luật Giao thông đường bộ \
                                Việt Nam. Tôi có thể giúp gì cho bạn?";

/// Returned while the pipeline is still loading
pub const STARTING_UP: &str = "Xin lỗi, hệ thống đang khởi động và chưa sẵn sàng. Vui lòng thử \
                               lại sau giây lát.";

/// Returned when retrieval finds no relevant passage
pub const NO_CONTEXT_FOUND: &str = "Tôi không tìm thấy thông tin cụ thể về vấn đề này trong các \
                                    tài liệu được cung cấp. Bạn vui lòng làm rõ câu hỏi hoặc tham \
                                    khảo các văn bản pháp lý chính thức.";

/// Returned when any query-time failure is caught at the ask boundary
pub const PROCESSING_ERROR: &str =
    "Đã có lỗi xảy ra trong quá trình xử lý câu hỏi của bạn.";

/// Self-referential phrases that bypass retrieval entirely
pub const META_QUESTION_PHRASES: [&str; 4] = [
    "bạn là ai",
    "bạn tên gì",
    "tôi vừa hỏi gì",
    "câu trước tôi hỏi",
];

/// Render the conversation transcript, one speaker per line
pub fn format_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .flat_map(|turn| {
            [
                format!("Người dùng: {}", turn.human),
                format!("AI: {}", turn.ai),
            ]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt that condenses a follow-up into a standalone question
pub fn condense_prompt(history: &[ConversationTurn], question: &str) -> String {
    format!(
        "Dựa vào đoạn hội thoại dưới đây và một câu hỏi tiếp theo, hãy diễn giải câu hỏi tiếp \
         theo thành một câu hỏi độc lập, đầy đủ bằng tiếng Việt.\n\n\
         Lịch sử trò chuyện:\n{}\n\n\
         Câu hỏi tiếp theo: {}\n\
         Câu hỏi độc lập:",
        format_history(history),
        question
    )
}

/// Prompt for meta-questions answered from the raw transcript, no retrieval
pub fn meta_prompt(history: &[ConversationTurn], question: &str) -> String {
    format!(
        "Dựa vào lịch sử hội thoại ngắn gọn sau, hãy trả lời câu hỏi của người dùng một cách tự \
         nhiên. Lịch sử chỉ dùng để tham khảo ngữ cảnh, không cần nhắc lại nó.\n\n\
         Lịch sử:\n{}\n\n\
         Câu hỏi của người dùng: {}\n\n\
         Câu trả lời của bạn:",
        format_history(history),
        question
    )
}

/// Render retrieved passages as the NGỮ CẢNH block, citation first
pub fn format_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|passage| {
            format!(
                "[Nguồn: {}]\n{}",
                passage.metadata.citation(),
                passage.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Strict grounded-answer prompt
pub fn grounded_prompt(passages: &[Passage], question: &str) -> String {
    format!(
        "Bạn tên là LawBot.\n\
         Bạn là một Trợ lý AI chuyên gia về Luật Giao thông Đường bộ Việt Nam.\n\
         Nhiệm vụ của bạn là cung cấp câu trả lời chính xác, rõ ràng và hữu ích cho người dùng \
         dựa **DUY NHẤT** vào các trích đoạn văn bản luật trong phần \"NGỮ CẢNH\" dưới đây.\n\n\
         **QUY TẮC BẮT BUỘC:**\n\
         1. **CHỈ DÙNG NGỮ CẢNH:** Câu trả lời phải hoàn toàn dựa trên thông tin có trong \
         \"NGỮ CẢNH\". Không được suy diễn hay dùng kiến thức bên ngoài.\n\
         2. **TRÍCH DẪN NGUỒN:** Sau mỗi luận điểm, hãy trích dẫn nguồn bằng cách sử dụng thông \
         tin metadata của văn bản. Ví dụ: \"(theo Điều X, Nghị định Y)\".\n\
         3. **KHÔNG CÓ THÔNG TIN:** Nếu \"NGỮ CẢNH\" không chứa thông tin để trả lời câu hỏi, \
         hãy trả lời một cách lịch sự: \"{}\"\n\
         4. **VĂN PHONG:** Sử dụng tiếng Việt, văn phong chuyên nghiệp, trang trọng nhưng dễ \
         hiểu.\n\n\
         ---\n\
         **NGỮ CẢNH (Trích đoạn từ văn bản luật):**\n{}\n\
         ---\n\n\
         **CÂU HỎI CỦA NGƯỜI DÙNG:**\n{}\n\n\
         **CÂU TRẢ LỜI CỦA BẠN (dựa vào NGỮ CẢNH, có trích dẫn nguồn):**",
        NO_CONTEXT_FOUND,
        format_context(passages),
        question
    )
}
